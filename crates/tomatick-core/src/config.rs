//! TOML-based application configuration.
//!
//! Stores:
//! - The default user the CLI acts for
//! - Device capabilities and push permission for hosts that cannot detect them
//! - Default log level
//!
//! Configuration is stored at `~/.config/tomatick/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;
use crate::notify::{DeviceCapabilities, PermissionState, StaticCapabilities};
use crate::user::UserId;

/// Overrides the data directory outright.
pub const DATA_DIR_ENV: &str = "TOMATICK_DATA_DIR";
/// `dev` selects a separate data directory.
pub const ENV_ENV: &str = "TOMATICK_ENV";

const CONFIG_FILE: &str = "config.toml";
const TIMER_SETTINGS_FILE: &str = "timer_settings.toml";
const NOTIFICATION_SETTINGS_FILE: &str = "notification_settings.toml";

/// Get the data directory for tomatick, creating it if needed.
///
/// `$TOMATICK_DATA_DIR` wins; otherwise `~/.config/tomatick`, or
/// `~/.config/tomatick-dev` when `TOMATICK_ENV=dev`.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var(ENV_ENV).unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("tomatick-dev")
            } else {
                base_dir.join("tomatick")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

pub fn timer_settings_path(dir: &Path) -> PathBuf {
    dir.join(TIMER_SETTINGS_FILE)
}

pub fn notification_settings_path(dir: &Path) -> PathBuf {
    dir.join(NOTIFICATION_SETTINGS_FILE)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// User id the CLI acts for when `--user` is not given.
    #[serde(default = "default_user_id")]
    pub id: u64,
}

/// Capabilities of the host, since a terminal cannot probe them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default = "default_true")]
    pub notifications: bool,
    #[serde(default = "default_true")]
    pub audio: bool,
    #[serde(default)]
    pub background_audio: bool,
    #[serde(default)]
    pub vibration: bool,
    /// Push permission at startup.
    #[serde(default)]
    pub permission: PermissionState,
    /// What a permission prompt resolves to.
    #[serde(default = "default_prompt_answer")]
    pub prompt_answer: PermissionState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when no env var or flag overrides it.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_user_id() -> u64 {
    1
}
fn default_true() -> bool {
    true
}
fn default_prompt_answer() -> PermissionState {
    PermissionState::Granted
}
fn default_log_level() -> String {
    "warn".into()
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            notifications: true,
            audio: true,
            background_audio: false,
            vibration: false,
            permission: PermissionState::Default,
            prompt_answer: default_prompt_answer(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut Value, key: &str, value: &str) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                Value::Bool(_) => Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                Value::Number(_) => Value::Number(
                    value
                        .parse::<u64>()
                        .map_err(|e| invalid(e.to_string()))?
                        .into(),
                ),
                Value::Object(_) => return Err(unknown()),
                _ => Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn collect_keys(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
        match value {
            Value::Object(map) => {
                for (name, child) in map {
                    let key = if prefix.is_empty() {
                        name.clone()
                    } else {
                        format!("{prefix}.{name}")
                    };
                    Self::collect_keys(&key, child, out);
                }
            }
            Value::String(s) => out.push((prefix.to_string(), s.clone())),
            other => out.push((prefix.to_string(), other.to_string())),
        }
    }

    /// `<data_dir>/config.toml`
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join(CONFIG_FILE))
    }

    /// Load from the data directory, writing the defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };
        toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match Self::get_json_value_by_path(&json, key)? {
            Value::String(s) => Some(s.clone()),
            Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.user_id().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        *self = updated;
        Ok(())
    }

    /// Every leaf key with its current value, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            Self::collect_keys("", &json, &mut out);
        }
        out.sort();
        out
    }

    pub fn user_id(&self) -> Result<UserId, crate::error::ValidationError> {
        UserId::new(self.user.id)
    }

    pub fn device_capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities {
            notifications: self.device.notifications,
            audio: self.device.audio,
            background_audio: self.device.background_audio,
            vibration: self.device.vibration,
        }
    }

    /// Capability provider seeded from the `[device]` section.
    pub fn capabilities(&self) -> StaticCapabilities {
        StaticCapabilities::new(self.device_capabilities(), self.device.permission)
            .with_prompt_answer(self.device.prompt_answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{CapabilityProvider, Channel, ChannelAvailability};

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.user.id, 1);
        assert_eq!(parsed.device.permission, PermissionState::Default);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let parsed: Config = toml::from_str("[device]\nvibration = true\n").unwrap();
        assert!(parsed.device.vibration);
        assert!(parsed.device.audio);
        assert_eq!(parsed.logging.level, "warn");
    }

    #[test]
    fn get_and_set_by_dot_path() {
        let mut cfg = Config::default();
        assert_eq!(cfg.get("device.audio").as_deref(), Some("true"));
        assert_eq!(cfg.get("device.permission").as_deref(), Some("default"));

        cfg.set("device.audio", "false").unwrap();
        cfg.set("device.permission", "granted").unwrap();
        cfg.set("user.id", "42").unwrap();
        cfg.set("logging.level", "debug").unwrap();

        assert!(!cfg.device.audio);
        assert_eq!(cfg.device.permission, PermissionState::Granted);
        assert_eq!(cfg.user.id, 42);
        assert_eq!(cfg.get("logging.level").as_deref(), Some("debug"));
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("device.teleport", "true"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("device", "x"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(
            cfg.set("device.audio", "loud"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("device.permission", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("user.id", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn entries_lists_leaf_keys() {
        let keys: Vec<String> = Config::default()
            .entries()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert!(keys.contains(&"device.prompt_answer".to_string()));
        assert!(keys.contains(&"logging.level".to_string()));
        assert!(keys.contains(&"user.id".to_string()));
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn save_and_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        let mut cfg = Config::default();
        cfg.set("device.vibration", "true").unwrap();
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn corrupt_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[device\nnotifications = ").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn capabilities_follow_device_section() {
        let mut cfg = Config::default();
        cfg.set("device.audio", "false").unwrap();
        let caps = cfg.capabilities();
        assert_eq!(caps.availability(Channel::Sound), ChannelAvailability::Unavailable);
        assert_eq!(
            caps.availability(Channel::Push),
            ChannelAvailability::PermissionPending
        );
    }
}
