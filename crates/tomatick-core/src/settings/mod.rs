//! Per-user timer and notification settings.

mod backend;
mod notification;
mod provider;
mod timer;

pub use backend::{MemoryBackend, SettingsBackend, TomlFileBackend};
pub use notification::{
    NotificationSettings, NotificationSettingsPatch, DEFAULT_SOUND_VOLUME, MAX_SOUND_VOLUME,
};
pub use provider::SettingsProvider;
pub use timer::{
    CycleDurations, TimerSettings, TimerSettingsUpdate, DEFAULT_FOCUS_MIN,
    DEFAULT_LONG_BREAK_MIN, DEFAULT_SHORT_BREAK_MIN, FOCUS_RANGE, LONG_BREAK_RANGE,
    SHORT_BREAK_RANGE,
};
