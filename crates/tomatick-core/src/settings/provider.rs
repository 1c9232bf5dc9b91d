use std::sync::Arc;

use tracing::debug;

use super::backend::{MemoryBackend, SettingsBackend};
use super::notification::{NotificationSettings, NotificationSettingsPatch};
use super::timer::{TimerSettings, TimerSettingsUpdate};
use crate::error::Result;
use crate::keyed::KeyedMutex;
use crate::user::UserId;

/// Per-user timer and notification settings with documented defaults.
///
/// Reads never come back empty: the first read for a user writes the defaults
/// through, so later reads see the same record. Every read-modify-write runs
/// inside that user's critical section.
pub struct SettingsProvider {
    timer: Arc<dyn SettingsBackend<TimerSettings>>,
    notification: Arc<dyn SettingsBackend<NotificationSettings>>,
    locks: KeyedMutex<UserId, ()>,
}

impl SettingsProvider {
    pub fn new(
        timer: Arc<dyn SettingsBackend<TimerSettings>>,
        notification: Arc<dyn SettingsBackend<NotificationSettings>>,
    ) -> Self {
        Self {
            timer,
            notification,
            locks: KeyedMutex::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryBackend::new()),
            Arc::new(MemoryBackend::new()),
        )
    }

    pub fn timer_settings(&self, user: UserId) -> Result<TimerSettings> {
        self.locks.with(user, |_| self.timer_or_default(user))
    }

    /// Replace all three durations. Nothing is written if validation fails.
    pub fn update_timer_settings(
        &self,
        user: UserId,
        update: &TimerSettingsUpdate,
    ) -> Result<TimerSettings> {
        let durations = update.validate()?;
        let settings = TimerSettings::from_durations(user, durations);
        self.locks.with(user, |_| self.timer.write(user, &settings))?;
        debug!(%user, ?durations, "timer settings replaced");
        Ok(settings)
    }

    pub fn notification_settings(&self, user: UserId) -> Result<NotificationSettings> {
        self.locks.with(user, |_| self.notification_or_default(user))
    }

    /// Merge `patch` over the current (or default) record.
    pub fn update_notification_settings(
        &self,
        user: UserId,
        patch: &NotificationSettingsPatch,
    ) -> Result<NotificationSettings> {
        self.locks.with(user, |_| {
            let current = self.notification_or_default(user)?;
            let merged = patch.apply(&current)?;
            self.notification.write(user, &merged)?;
            debug!(%user, ?patch, "notification settings merged");
            Ok(merged)
        })
    }

    fn timer_or_default(&self, user: UserId) -> Result<TimerSettings> {
        if let Some(settings) = self.timer.read(user)? {
            return Ok(settings);
        }
        let settings = TimerSettings::defaults_for(user);
        self.timer.write(user, &settings)?;
        Ok(settings)
    }

    fn notification_or_default(&self, user: UserId) -> Result<NotificationSettings> {
        if let Some(settings) = self.notification.read(user)? {
            return Ok(settings);
        }
        let settings = NotificationSettings::defaults_for(user);
        self.notification.write(user, &settings)?;
        Ok(settings)
    }
}

impl Default for SettingsProvider {
    fn default() -> Self {
        Self::in_memory()
    }
}
