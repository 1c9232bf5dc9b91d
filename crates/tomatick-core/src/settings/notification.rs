use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::user::UserId;

pub const DEFAULT_SOUND_VOLUME: u8 = 80;
pub const MAX_SOUND_VOLUME: u8 = 100;

/// Which notification channels a user wants. Vibration has no toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub user_id: UserId,
    pub visual_alerts_enabled: bool,
    pub push_notifications_enabled: bool,
    pub sound_alerts_enabled: bool,
    /// 0..=100
    pub sound_volume: u8,
    pub updated_at: DateTime<Utc>,
}

impl NotificationSettings {
    pub fn defaults_for(user_id: UserId) -> Self {
        Self {
            user_id,
            visual_alerts_enabled: true,
            push_notifications_enabled: true,
            sound_alerts_enabled: true,
            sound_volume: DEFAULT_SOUND_VOLUME,
            updated_at: Utc::now(),
        }
    }

    /// Playback gain in `[0.0, 1.0]`.
    pub fn volume_ratio(&self) -> f32 {
        (f32::from(self.sound_volume) / 100.0).clamp(0.0, 1.0)
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettingsPatch {
    pub visual_alerts_enabled: Option<bool>,
    pub push_notifications_enabled: Option<bool>,
    pub sound_alerts_enabled: Option<bool>,
    pub sound_volume: Option<i64>,
}

impl NotificationSettingsPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Merge over `current`, stamping a fresh `updated_at`.
    pub fn apply(
        &self,
        current: &NotificationSettings,
    ) -> Result<NotificationSettings, ValidationError> {
        let sound_volume = match self.sound_volume {
            Some(value) => volume_in_range(value)?,
            None => current.sound_volume,
        };

        Ok(NotificationSettings {
            user_id: current.user_id,
            visual_alerts_enabled: self
                .visual_alerts_enabled
                .unwrap_or(current.visual_alerts_enabled),
            push_notifications_enabled: self
                .push_notifications_enabled
                .unwrap_or(current.push_notifications_enabled),
            sound_alerts_enabled: self
                .sound_alerts_enabled
                .unwrap_or(current.sound_alerts_enabled),
            sound_volume,
            updated_at: Utc::now(),
        })
    }
}

fn volume_in_range(value: i64) -> Result<u8, ValidationError> {
    match u8::try_from(value) {
        Ok(volume) if volume <= MAX_SOUND_VOLUME => Ok(volume),
        _ => Err(ValidationError::OutOfRange {
            field: "soundVolume",
            min: 0,
            max: i64::from(MAX_SOUND_VOLUME),
            value,
        }),
    }
}
