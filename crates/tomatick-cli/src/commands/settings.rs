use clap::Subcommand;
use tomatick_core::{NotificationSettingsPatch, TimerSettingsUpdate};

use crate::context::Context;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Focus and break durations
    Timer {
        #[command(subcommand)]
        action: TimerSettingsAction,
    },
    /// Notification channel preferences
    Notify {
        #[command(subcommand)]
        action: NotifySettingsAction,
    },
}

#[derive(Subcommand)]
pub enum TimerSettingsAction {
    /// Print timer settings as JSON
    Get,
    /// Replace all three durations (minutes)
    Set {
        /// Focus length, 5-90
        #[arg(long)]
        focus: Option<i64>,
        /// Short break length, 1-30
        #[arg(long)]
        short_break: Option<i64>,
        /// Long break length, 10-60
        #[arg(long)]
        long_break: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum NotifySettingsAction {
    /// Print notification settings as JSON
    Get,
    /// Change only the given preferences
    Set {
        #[arg(long)]
        visual: Option<bool>,
        #[arg(long)]
        push: Option<bool>,
        #[arg(long)]
        sound: Option<bool>,
        /// Sound volume, 0-100
        #[arg(long)]
        volume: Option<i64>,
    },
}

pub fn run(ctx: &Context, action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SettingsAction::Timer { action } => match action {
            TimerSettingsAction::Get => {
                let settings = ctx.settings.timer_settings(ctx.user)?;
                println!("{}", serde_json::to_string_pretty(&settings)?);
            }
            TimerSettingsAction::Set {
                focus,
                short_break,
                long_break,
            } => {
                let update = TimerSettingsUpdate {
                    focus_duration: focus,
                    short_break_duration: short_break,
                    long_break_duration: long_break,
                };
                let settings = ctx.settings.update_timer_settings(ctx.user, &update)?;
                println!("{}", serde_json::to_string_pretty(&settings)?);
            }
        },
        SettingsAction::Notify { action } => match action {
            NotifySettingsAction::Get => {
                let settings = ctx.settings.notification_settings(ctx.user)?;
                println!("{}", serde_json::to_string_pretty(&settings)?);
            }
            NotifySettingsAction::Set {
                visual,
                push,
                sound,
                volume,
            } => {
                let patch = NotificationSettingsPatch {
                    visual_alerts_enabled: visual,
                    push_notifications_enabled: push,
                    sound_alerts_enabled: sound,
                    sound_volume: volume,
                };
                if patch.is_empty() {
                    return Err("nothing to update; pass at least one of --visual, --push, --sound, --volume".into());
                }
                let settings = ctx.settings.update_notification_settings(ctx.user, &patch)?;
                println!("{}", serde_json::to_string_pretty(&settings)?);
            }
        },
    }
    Ok(())
}
