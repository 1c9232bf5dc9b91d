//! Runtime capability detection.
//!
//! Which channels exist depends on the host (a terminal has no vibration
//! motor, a headless box has no audio). The dispatcher only ever asks a
//! [`CapabilityProvider`], so hosts and tests plug in their own.

use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{ChannelError, ValidationError};

/// Delivery channels, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Visual,
    Push,
    Sound,
    Vibration,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Visual,
        Channel::Push,
        Channel::Sound,
        Channel::Vibration,
    ];

    /// Channels a diagnostic test may exercise.
    pub const TESTABLE: [Channel; 3] = [Channel::Visual, Channel::Push, Channel::Sound];

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Visual => "visual",
            Channel::Push => "push",
            Channel::Sound => "sound",
            Channel::Vibration => "vibration",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|channel| channel.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownChannel(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCapabilities {
    pub notifications: bool,
    pub audio: bool,
    pub background_audio: bool,
    pub vibration: bool,
}

/// Push permission as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// Never asked.
    #[default]
    Default,
    Granted,
    Denied,
}

/// Whether a channel can fire right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelAvailability {
    Available,
    Unavailable,
    PermissionPending,
    PermissionDenied,
}

pub trait CapabilityProvider: Send + Sync {
    fn capabilities(&self) -> DeviceCapabilities;

    fn permission(&self) -> PermissionState;

    /// Prompt the user for push permission. Only ever called on explicit
    /// request, never during a fan-out.
    fn request_permission(&self) -> Result<PermissionState, ChannelError>;

    fn availability(&self, channel: Channel) -> ChannelAvailability {
        let caps = self.capabilities();
        match channel {
            Channel::Visual => ChannelAvailability::Available,
            Channel::Push if !caps.notifications => ChannelAvailability::Unavailable,
            Channel::Push => match self.permission() {
                PermissionState::Granted => ChannelAvailability::Available,
                PermissionState::Default => ChannelAvailability::PermissionPending,
                PermissionState::Denied => ChannelAvailability::PermissionDenied,
            },
            Channel::Sound if caps.audio => ChannelAvailability::Available,
            Channel::Vibration if caps.vibration => ChannelAvailability::Available,
            Channel::Sound | Channel::Vibration => ChannelAvailability::Unavailable,
        }
    }
}

/// Capabilities fixed at construction, with a scripted answer to permission
/// prompts.
#[derive(Debug)]
pub struct StaticCapabilities {
    capabilities: DeviceCapabilities,
    permission: RwLock<PermissionState>,
    prompt_answer: PermissionState,
}

impl StaticCapabilities {
    pub fn new(capabilities: DeviceCapabilities, permission: PermissionState) -> Self {
        Self {
            capabilities,
            permission: RwLock::new(permission),
            prompt_answer: PermissionState::Granted,
        }
    }

    /// What a permission prompt resolves to.
    pub fn with_prompt_answer(mut self, answer: PermissionState) -> Self {
        self.prompt_answer = answer;
        self
    }

    /// Every channel present, permission already granted.
    pub fn everything() -> Self {
        Self::new(
            DeviceCapabilities {
                notifications: true,
                audio: true,
                background_audio: true,
                vibration: true,
            },
            PermissionState::Granted,
        )
    }

    /// Only the visual channel works.
    pub fn headless() -> Self {
        Self::new(DeviceCapabilities::default(), PermissionState::Denied)
    }
}

impl CapabilityProvider for StaticCapabilities {
    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn permission(&self) -> PermissionState {
        *self.permission.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn request_permission(&self) -> Result<PermissionState, ChannelError> {
        let mut permission = self.permission.write().unwrap_or_else(PoisonError::into_inner);
        // A decided permission is sticky; only the first prompt changes it.
        if *permission == PermissionState::Default {
            *permission = self.prompt_answer;
        }
        Ok(*permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visual_is_always_available() {
        let caps = StaticCapabilities::headless();
        assert_eq!(caps.availability(Channel::Visual), ChannelAvailability::Available);
        assert_eq!(caps.availability(Channel::Push), ChannelAvailability::Unavailable);
        assert_eq!(caps.availability(Channel::Sound), ChannelAvailability::Unavailable);
        assert_eq!(caps.availability(Channel::Vibration), ChannelAvailability::Unavailable);
    }

    #[test]
    fn push_availability_follows_permission() {
        let caps = DeviceCapabilities {
            notifications: true,
            ..Default::default()
        };
        let pending = StaticCapabilities::new(caps, PermissionState::Default);
        assert_eq!(
            pending.availability(Channel::Push),
            ChannelAvailability::PermissionPending
        );

        let denied = StaticCapabilities::new(caps, PermissionState::Denied);
        assert_eq!(
            denied.availability(Channel::Push),
            ChannelAvailability::PermissionDenied
        );
    }

    #[test]
    fn prompt_resolves_default_permission_once() {
        let caps = StaticCapabilities::new(
            DeviceCapabilities {
                notifications: true,
                ..Default::default()
            },
            PermissionState::Default,
        )
        .with_prompt_answer(PermissionState::Denied);

        assert_eq!(caps.request_permission(), Ok(PermissionState::Denied));
        assert_eq!(caps.permission(), PermissionState::Denied);
    }

    #[test]
    fn channel_names_round_trip() {
        for channel in Channel::ALL {
            assert_eq!(channel.as_str().parse::<Channel>(), Ok(channel));
        }
        assert!("smoke-signal".parse::<Channel>().is_err());
    }
}
