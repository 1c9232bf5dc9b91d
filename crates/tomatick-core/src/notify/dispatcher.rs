use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::capability::{CapabilityProvider, Channel, ChannelAvailability, PermissionState};
use super::channel::{NotificationChannels, PushMessage, VIBRATION_PATTERN_MS};
use super::content::{CycleEvent, NotificationContent};
use super::report::{ChannelOutcome, ChannelReport, DispatchReport, SkipReason};
use crate::error::{ChannelError, Result, ValidationError};
use crate::settings::{NotificationSettings, SettingsProvider};
use crate::user::UserId;

/// Name that expands to every testable channel.
pub const ALL_CHANNELS: &str = "all";

/// Parse channel names for a diagnostic test.
///
/// `all` expands to visual, push and sound. Vibration exists but is not
/// testable.
pub fn parse_test_channels<S: AsRef<str>>(names: &[S]) -> Result<Vec<Channel>, ValidationError> {
    let mut channels = Vec::new();
    for name in names {
        let name = name.as_ref();
        if name == ALL_CHANNELS {
            channels.extend(Channel::TESTABLE);
            continue;
        }
        let channel: Channel = name.parse()?;
        if !Channel::TESTABLE.contains(&channel) {
            return Err(ValidationError::ChannelNotTestable(name.to_string()));
        }
        channels.push(channel);
    }
    channels.sort();
    channels.dedup();
    Ok(channels)
}

/// Fans a cycle event out to the user's enabled, available channels.
///
/// Channels are visited in a fixed order (visual, push, sound, vibration)
/// and each one is isolated: a failure is logged and recorded in the report,
/// and the remaining channels still run.
pub struct NotificationDispatcher {
    settings: Arc<SettingsProvider>,
    capabilities: Arc<dyn CapabilityProvider>,
    channels: NotificationChannels,
}

impl NotificationDispatcher {
    pub fn new(
        settings: Arc<SettingsProvider>,
        capabilities: Arc<dyn CapabilityProvider>,
        channels: NotificationChannels,
    ) -> Self {
        Self {
            settings,
            capabilities,
            channels,
        }
    }

    pub fn capabilities(&self) -> &dyn CapabilityProvider {
        self.capabilities.as_ref()
    }

    /// Fan out `event` to the subset of `channels` that `settings` enables.
    pub fn dispatch(
        &self,
        event: CycleEvent,
        settings: &NotificationSettings,
        channels: &[Channel],
    ) -> DispatchReport {
        let content = event.content();
        let results = Channel::ALL
            .into_iter()
            .filter(|channel| channels.contains(channel))
            .map(|channel| ChannelReport {
                channel,
                outcome: self.fire(channel, content, settings),
            })
            .collect();
        DispatchReport::new(event, results)
    }

    /// Fire-and-forget notification for a cycle transition.
    ///
    /// Never fails. If the user's settings cannot be read the defaults are
    /// used instead.
    pub fn trigger(&self, user: UserId, event: CycleEvent) -> DispatchReport {
        let settings = match self.settings.notification_settings(user) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(%user, error = %err, "notification settings unavailable, using defaults");
                NotificationSettings::defaults_for(user)
            }
        };

        let report = self.dispatch(event, &settings, &Channel::ALL);
        debug!(
            %user,
            %event,
            delivered = report.delivered_count(),
            failed = report.failure_count(),
            "notification fan-out finished"
        );
        report
    }

    /// Run a diagnostic notification on exactly the requested channels.
    pub fn test_notification(
        &self,
        user: UserId,
        event: CycleEvent,
        channels: &[Channel],
    ) -> Result<BTreeMap<Channel, bool>> {
        if let Some(channel) = channels.iter().find(|c| !Channel::TESTABLE.contains(*c)) {
            return Err(ValidationError::ChannelNotTestable(channel.to_string()).into());
        }
        let settings = self.settings.notification_settings(user)?;
        Ok(self.dispatch(event, &settings, channels).success_map())
    }

    /// Prompt for push permission. Hosts without notifications answer
    /// `Denied` without prompting.
    pub fn request_permission(&self) -> Result<PermissionState, ChannelError> {
        if !self.capabilities.capabilities().notifications {
            return Ok(PermissionState::Denied);
        }
        let state = self.capabilities.request_permission()?;
        debug!(?state, "push permission resolved");
        Ok(state)
    }

    fn fire(
        &self,
        channel: Channel,
        content: &NotificationContent,
        settings: &NotificationSettings,
    ) -> ChannelOutcome {
        let enabled = match channel {
            Channel::Visual => settings.visual_alerts_enabled,
            Channel::Push => settings.push_notifications_enabled,
            Channel::Sound => settings.sound_alerts_enabled,
            Channel::Vibration => true,
        };
        if !enabled {
            return ChannelOutcome::Skipped {
                reason: SkipReason::Disabled,
            };
        }

        let reason = match self.capabilities.availability(channel) {
            ChannelAvailability::Available => None,
            ChannelAvailability::Unavailable => Some(SkipReason::Unavailable),
            ChannelAvailability::PermissionPending => Some(SkipReason::PermissionPending),
            ChannelAvailability::PermissionDenied => Some(SkipReason::PermissionDenied),
        };
        if let Some(reason) = reason {
            debug!(%channel, ?reason, "channel skipped");
            return ChannelOutcome::Skipped { reason };
        }

        let result = match channel {
            Channel::Visual => self.channels.visual.show(content),
            Channel::Push => self.channels.push.notify(&PushMessage {
                title: content.title,
                body: content.message,
                tag: content.event.as_str(),
            }),
            Channel::Sound => self
                .channels
                .sound
                .play(content.sound_file, settings.volume_ratio()),
            Channel::Vibration => self.channels.vibration.vibrate(&VIBRATION_PATTERN_MS),
        };

        match result {
            Ok(()) => ChannelOutcome::Delivered,
            Err(err) => {
                warn!(%channel, event = %content.event, error = %err, "notification channel failed");
                ChannelOutcome::Failed {
                    reason: err.message,
                }
            }
        }
    }
}
