//! # Tomatick Core Library
//!
//! Core logic for the Tomatick focus timer. Every operation is available
//! to the `tomatick` CLI; other front ends are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: a clock-free state machine for focus/break cycles, plus an
//!   async controller that drives it once a second and turns completions
//!   into history entries and notifications
//! - **History**: bounded, newest-first per-user session history
//! - **Notify**: static content table, host capability detection and a
//!   fault-isolated fan-out over visual, push, sound and vibration channels
//! - **Settings**: per-user timer durations and notification preferences
//!   over a pluggable backend (memory or TOML file)
//!
//! ## Key Components
//!
//! - [`CycleController`]: per-user timer driver
//! - [`HistoryStore`]: session history contract
//! - [`NotificationDispatcher`]: channel fan-out
//! - [`SettingsProvider`]: settings with documented defaults
//! - [`Config`]: application configuration management

pub mod config;
pub mod error;
pub mod events;
pub mod history;
mod keyed;
pub mod notify;
pub mod settings;
pub mod timer;
mod user;

pub use config::{data_dir, Config};
pub use error::{ChannelError, ConfigError, CoreError, StoreError, ValidationError};
pub use events::Event;
pub use history::{
    CreateSessionRequest, HistoryStore, InMemoryHistory, NewSession, SessionId, SessionRecord,
};
pub use keyed::KeyedMutex;
pub use notify::{
    CapabilityProvider, Channel, CycleEvent, DispatchReport, NotificationChannels,
    NotificationContent, NotificationDispatcher, PermissionState, StaticCapabilities,
};
pub use settings::{
    CycleDurations, NotificationSettings, NotificationSettingsPatch, SettingsProvider,
    TimerSettings, TimerSettingsUpdate,
};
pub use timer::{CycleController, TimerMode, TimerSnapshot, TimerStatus};
pub use user::UserId;
