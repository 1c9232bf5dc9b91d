use std::sync::Arc;

use tomatick_core::config::{notification_settings_path, timer_settings_path};
use tomatick_core::settings::TomlFileBackend;
use tomatick_core::{
    data_dir, Config, NotificationDispatcher, NotificationSettings, SettingsProvider,
    TimerSettings, UserId,
};

use crate::channels::terminal_channels;

/// Everything a command needs, resolved from the data directory.
pub struct Context {
    pub config: Config,
    pub user: UserId,
    pub settings: Arc<SettingsProvider>,
}

impl Context {
    pub fn open(config: Config, user: Option<u64>) -> Result<Self, Box<dyn std::error::Error>> {
        let data_dir = data_dir()?;
        let user = match user {
            Some(raw) => UserId::new(raw)?,
            None => config.user_id()?,
        };

        let timer = TomlFileBackend::<TimerSettings>::open(timer_settings_path(&data_dir))?;
        let notification =
            TomlFileBackend::<NotificationSettings>::open(notification_settings_path(&data_dir))?;
        let settings = Arc::new(SettingsProvider::new(Arc::new(timer), Arc::new(notification)));

        Ok(Self {
            config,
            user,
            settings,
        })
    }

    /// Dispatcher over terminal channels and the configured device.
    pub fn dispatcher(&self) -> NotificationDispatcher {
        NotificationDispatcher::new(
            self.settings.clone(),
            Arc::new(self.config.capabilities()),
            terminal_channels(),
        )
    }
}
