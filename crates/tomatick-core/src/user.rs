use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Opaque identifier of an already-authenticated user.
///
/// Identity resolution happens outside the core; the only rule enforced here
/// is that the id is a positive integer that fits a TOML integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct UserId(u64);

/// Largest accepted id. TOML integers are signed 64-bit.
pub const MAX_USER_ID: u64 = i64::MAX as u64;

impl UserId {
    pub fn new(raw: u64) -> Result<Self, ValidationError> {
        if raw == 0 || raw > MAX_USER_ID {
            return Err(ValidationError::InvalidUserId);
        }
        Ok(Self(raw))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for UserId {
    type Error = ValidationError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<UserId> for u64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
