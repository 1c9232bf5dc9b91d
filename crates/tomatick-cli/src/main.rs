use clap::{Parser, Subcommand};
use tomatick_core::Config;

mod channels;
mod commands;
mod context;
mod logging;

use context::Context;

#[derive(Parser)]
#[command(name = "tomatick", version, about = "Tomatick focus timer CLI")]
struct Cli {
    /// Debug-level logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Only errors on stderr
    #[arg(short, long, global = true)]
    quiet: bool,
    /// Act as this user instead of the configured one
    #[arg(long, global = true)]
    user: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive timer session
    Timer(commands::timer::TimerArgs),
    /// Per-user timer and notification settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Notification content, diagnostics and permission
    Notify {
        #[command(subcommand)]
        action: commands::notify::NotifyAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    logging::init(
        logging::Verbosity::from_flags(cli.verbose, cli.quiet),
        &config.logging.level,
    );
    tracing::debug!(user = ?cli.user, "configuration loaded");

    match cli.command {
        Commands::Config { action } => commands::config::run(config, action),
        Commands::Timer(args) => commands::timer::run(&Context::open(config, cli.user)?, args),
        Commands::Settings { action } => {
            commands::settings::run(&Context::open(config, cli.user)?, action)
        }
        Commands::Notify { action } => {
            commands::notify::run(&mut Context::open(config, cli.user)?, action)
        }
    }
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
