//! Core error types for tomatick-core.
//!
//! Validation failures are surfaced to the caller before any state changes.
//! Lookups that miss (deleting an unknown session, reading an absent user)
//! are reported through booleans and empty collections, not errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tomatick-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed or out-of-range input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Backing store could not complete the operation
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A notification channel refused the call
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Input validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Numeric value outside its documented range
    #[error("'{field}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },

    /// Text longer than allowed (measured in characters)
    #[error("'{field}' must be at most {max} characters, got {len}")]
    TooLong {
        field: &'static str,
        max: usize,
        len: usize,
    },

    /// Value must be a positive integer
    #[error("'{field}' must be a positive integer, got {value}")]
    NotPositive { field: &'static str, value: i64 },

    /// Required field absent from a full-replace update
    #[error("'{0}' is required")]
    MissingField(&'static str),

    #[error("Unknown notification type: '{0}'")]
    UnknownEventType(String),

    #[error("Unknown notification channel: '{0}'")]
    UnknownChannel(String),

    /// Channel exists but cannot be exercised by a diagnostic test
    #[error("Channel '{0}' cannot be tested")]
    ChannelNotTestable(String),

    /// Timestamp is not valid ISO-8601 / RFC 3339
    #[error("Invalid timestamp '{value}': {message}")]
    InvalidTimestamp { value: String, message: String },

    #[error("User id must be between 1 and 9223372036854775807")]
    InvalidUserId,
}

/// Errors raised by history and settings backends.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend is temporarily unable to serve requests
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Backing file could not be read or written
    #[error("Failed to access store file {path}: {message}")]
    File { path: PathBuf, message: String },

    /// Backing file contents could not be decoded
    #[error("Corrupt store file {path}: {message}")]
    Corrupt { path: PathBuf, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// A single notification channel failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{channel} channel failed: {message}")]
pub struct ChannelError {
    pub channel: &'static str,
    pub message: String,
}

impl ChannelError {
    pub fn new(channel: &'static str, message: impl Into<String>) -> Self {
        Self {
            channel,
            message: message.into(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_wraps_into_core_error() {
        let err: CoreError = ValidationError::MissingField("focusDuration").into();
        assert!(matches!(err, CoreError::Validation(ValidationError::MissingField(_))));
        assert_eq!(err.to_string(), "Validation error: 'focusDuration' is required");
    }

    #[test]
    fn out_of_range_message_names_bounds() {
        let err = ValidationError::OutOfRange {
            field: "focusDuration",
            min: 5,
            max: 90,
            value: 120,
        };
        assert_eq!(
            err.to_string(),
            "'focusDuration' must be between 5 and 90, got 120"
        );
    }
}
