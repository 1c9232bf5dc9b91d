use clap::Subcommand;
use tomatick_core::notify::{parse_test_channels, resolve_content};
use tomatick_core::CycleEvent;

use crate::context::Context;

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Print the content for a notification type as JSON
    Content {
        /// inicio_pomodoro, fim_pomodoro, inicio_intervalo or fim_intervalo
        event_type: String,
    },
    /// Send a diagnostic notification and report which channels fired
    Test {
        /// Notification type
        event_type: String,
        /// visual, push, sound or all (repeatable)
        #[arg(long = "channel", required = true)]
        channels: Vec<String>,
    },
    /// Ask for push notification permission
    Permission,
}

pub fn run(ctx: &mut Context, action: NotifyAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        NotifyAction::Content { event_type } => {
            let content = resolve_content(&event_type)?;
            println!("{}", serde_json::to_string_pretty(content)?);
        }
        NotifyAction::Test {
            event_type,
            channels,
        } => {
            let event: CycleEvent = event_type.parse()?;
            let channels = parse_test_channels(&channels)?;
            let results = ctx
                .dispatcher()
                .test_notification(ctx.user, event, &channels)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        NotifyAction::Permission => {
            let state = ctx.dispatcher().request_permission()?;
            if state != ctx.config.device.permission {
                ctx.config.device.permission = state;
                ctx.config.save()?;
            }
            println!("{}", serde_json::to_string(&state)?);
        }
    }
    Ok(())
}
