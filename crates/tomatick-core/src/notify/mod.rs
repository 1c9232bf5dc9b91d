//! Notification fan-out: content table, host capabilities, channel
//! primitives and the dispatcher tying them to user settings.

mod capability;
mod channel;
mod content;
mod dispatcher;
mod report;

pub use capability::{
    CapabilityProvider, Channel, ChannelAvailability, DeviceCapabilities, PermissionState,
    StaticCapabilities,
};
pub use channel::{
    AlertSurface, LogChannel, NotificationChannels, PushMessage, PushNotifier, SoundPlayer,
    Vibrator, VIBRATION_PATTERN_MS,
};
pub use content::{resolve_content, CycleEvent, NotificationContent};
pub use dispatcher::{parse_test_channels, NotificationDispatcher, ALL_CHANNELS};
pub use report::{ChannelOutcome, ChannelReport, DispatchReport, SkipReason};
