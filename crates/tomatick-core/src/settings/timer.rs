use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::user::UserId;

pub const FOCUS_RANGE: RangeInclusive<u32> = 5..=90;
pub const SHORT_BREAK_RANGE: RangeInclusive<u32> = 1..=30;
pub const LONG_BREAK_RANGE: RangeInclusive<u32> = 10..=60;

pub const DEFAULT_FOCUS_MIN: u32 = 25;
pub const DEFAULT_SHORT_BREAK_MIN: u32 = 5;
pub const DEFAULT_LONG_BREAK_MIN: u32 = 15;

/// Minutes configured for each cycle mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleDurations {
    pub focus_min: u32,
    pub short_break_min: u32,
    pub long_break_min: u32,
}

impl Default for CycleDurations {
    fn default() -> Self {
        Self {
            focus_min: DEFAULT_FOCUS_MIN,
            short_break_min: DEFAULT_SHORT_BREAK_MIN,
            long_break_min: DEFAULT_LONG_BREAK_MIN,
        }
    }
}

/// Stored timer configuration for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    pub user_id: UserId,
    pub focus_duration: u32,
    pub short_break_duration: u32,
    pub long_break_duration: u32,
    pub updated_at: DateTime<Utc>,
}

impl TimerSettings {
    pub fn defaults_for(user_id: UserId) -> Self {
        Self::from_durations(user_id, CycleDurations::default())
    }

    pub fn from_durations(user_id: UserId, durations: CycleDurations) -> Self {
        Self {
            user_id,
            focus_duration: durations.focus_min,
            short_break_duration: durations.short_break_min,
            long_break_duration: durations.long_break_min,
            updated_at: Utc::now(),
        }
    }

    pub fn durations(&self) -> CycleDurations {
        CycleDurations {
            focus_min: self.focus_duration,
            short_break_min: self.short_break_duration,
            long_break_min: self.long_break_duration,
        }
    }
}

/// Write payload for timer settings.
///
/// Fields are optional only so that a missing one can be reported; an update
/// is a full replace and every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettingsUpdate {
    pub focus_duration: Option<i64>,
    pub short_break_duration: Option<i64>,
    pub long_break_duration: Option<i64>,
}

impl TimerSettingsUpdate {
    pub fn new(focus: i64, short_break: i64, long_break: i64) -> Self {
        Self {
            focus_duration: Some(focus),
            short_break_duration: Some(short_break),
            long_break_duration: Some(long_break),
        }
    }

    /// Check presence and bounds of every field.
    pub fn validate(&self) -> Result<CycleDurations, ValidationError> {
        Ok(CycleDurations {
            focus_min: required_in_range("focusDuration", self.focus_duration, FOCUS_RANGE)?,
            short_break_min: required_in_range(
                "shortBreakDuration",
                self.short_break_duration,
                SHORT_BREAK_RANGE,
            )?,
            long_break_min: required_in_range(
                "longBreakDuration",
                self.long_break_duration,
                LONG_BREAK_RANGE,
            )?,
        })
    }
}

fn required_in_range(
    field: &'static str,
    value: Option<i64>,
    range: RangeInclusive<u32>,
) -> Result<u32, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField(field))?;
    let (min, max) = (*range.start(), *range.end());
    match u32::try_from(value) {
        Ok(minutes) if range.contains(&minutes) => Ok(minutes),
        _ => Err(ValidationError::OutOfRange {
            field,
            min: i64::from(min),
            max: i64::from(max),
            value,
        }),
    }
}
