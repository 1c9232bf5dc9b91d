//! Effectful notification primitives.
//!
//! Each trait wraps one host facility. Calls report only whether the host
//! accepted them; nothing here waits for the user to actually see or hear
//! anything.

use std::sync::Arc;

use tracing::info;

use super::content::NotificationContent;
use crate::error::ChannelError;

/// Vibration pattern in milliseconds: buzz, pause, buzz.
pub const VIBRATION_PATTERN_MS: [u64; 3] = [200, 100, 200];

/// In-app alert (banner, toast, terminal line).
pub trait AlertSurface: Send + Sync {
    fn show(&self, content: &NotificationContent) -> Result<(), ChannelError>;
}

pub struct PushMessage<'a> {
    pub title: &'a str,
    pub body: &'a str,
    /// Event type string; hosts use it to collapse repeats.
    pub tag: &'a str,
}

/// OS-level notification.
pub trait PushNotifier: Send + Sync {
    fn notify(&self, message: &PushMessage<'_>) -> Result<(), ChannelError>;
}

pub trait SoundPlayer: Send + Sync {
    /// `volume` is already clamped to `[0.0, 1.0]`.
    fn play(&self, sound_file: &str, volume: f32) -> Result<(), ChannelError>;
}

pub trait Vibrator: Send + Sync {
    fn vibrate(&self, pattern_ms: &[u64]) -> Result<(), ChannelError>;
}

/// The set of primitives a dispatcher fans out to.
#[derive(Clone)]
pub struct NotificationChannels {
    pub visual: Arc<dyn AlertSurface>,
    pub push: Arc<dyn PushNotifier>,
    pub sound: Arc<dyn SoundPlayer>,
    pub vibration: Arc<dyn Vibrator>,
}

impl NotificationChannels {
    /// Every channel writes a log line instead of touching the host.
    pub fn logging() -> Self {
        let sink = Arc::new(LogChannel);
        Self {
            visual: sink.clone(),
            push: sink.clone(),
            sound: sink.clone(),
            vibration: sink,
        }
    }
}

/// Records channel activity through `tracing`.
pub struct LogChannel;

impl AlertSurface for LogChannel {
    fn show(&self, content: &NotificationContent) -> Result<(), ChannelError> {
        info!(event = %content.event, title = content.title, "visual alert");
        Ok(())
    }
}

impl PushNotifier for LogChannel {
    fn notify(&self, message: &PushMessage<'_>) -> Result<(), ChannelError> {
        info!(tag = message.tag, title = message.title, "push notification");
        Ok(())
    }
}

impl SoundPlayer for LogChannel {
    fn play(&self, sound_file: &str, volume: f32) -> Result<(), ChannelError> {
        info!(sound_file, volume, "sound alert");
        Ok(())
    }
}

impl Vibrator for LogChannel {
    fn vibrate(&self, pattern_ms: &[u64]) -> Result<(), ChannelError> {
        info!(?pattern_ms, "vibration");
        Ok(())
    }
}
