//! Notification channels for a terminal host.
//!
//! Everything is written to stderr so that stdout stays reserved for
//! command output.

use std::io::Write;
use std::sync::Arc;

use tomatick_core::notify::{
    AlertSurface, LogChannel, PushMessage, PushNotifier, SoundPlayer,
};
use tomatick_core::{ChannelError, NotificationChannels, NotificationContent};

/// Inline alert line.
pub struct TerminalSurface;

impl AlertSurface for TerminalSurface {
    fn show(&self, content: &NotificationContent) -> Result<(), ChannelError> {
        let mut err = std::io::stderr().lock();
        writeln!(err, "[{}] {}: {}", content.icon, content.title, content.message)
            .map_err(|e| ChannelError::new("visual", e.to_string()))
    }
}

/// Stand-in for an OS notification: a tagged line.
pub struct TerminalPush;

impl PushNotifier for TerminalPush {
    fn notify(&self, message: &PushMessage<'_>) -> Result<(), ChannelError> {
        let mut err = std::io::stderr().lock();
        writeln!(err, "notification ({}): {} - {}", message.tag, message.title, message.body)
            .map_err(|e| ChannelError::new("push", e.to_string()))
    }
}

/// Rings the terminal bell. Muted volume means no bell.
pub struct TerminalBell;

impl SoundPlayer for TerminalBell {
    fn play(&self, sound_file: &str, volume: f32) -> Result<(), ChannelError> {
        tracing::debug!(sound_file, volume, "ringing terminal bell");
        if volume <= 0.0 {
            return Ok(());
        }
        let mut err = std::io::stderr().lock();
        err.write_all(b"\x07")
            .and_then(|()| err.flush())
            .map_err(|e| ChannelError::new("sound", e.to_string()))
    }
}

/// Terminal channels; vibration only logs.
pub fn terminal_channels() -> NotificationChannels {
    NotificationChannels {
        visual: Arc::new(TerminalSurface),
        push: Arc::new(TerminalPush),
        sound: Arc::new(TerminalBell),
        vibration: Arc::new(LogChannel),
    }
}
