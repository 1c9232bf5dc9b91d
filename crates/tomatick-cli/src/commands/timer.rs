//! Interactive timer session.
//!
//! Reads commands from stdin while the cycle runs in the background; events
//! are printed as they arrive.

use std::sync::Arc;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use tomatick_core::{CycleController, Event, HistoryStore, InMemoryHistory, TimerMode, UserId};

use crate::context::Context;

const HELP: &str = "commands: start [description] | pause | resume | stop | mode <focus|short|long> | status | history | delete <id> | quit";

#[derive(Args)]
pub struct TimerArgs {
    /// Description used by `start` when none is typed
    #[arg(long, default_value = "")]
    pub description: String,
    /// Start a run immediately
    #[arg(long)]
    pub start: bool,
}

enum Flow {
    Continue,
    Quit,
}

pub fn run(ctx: &Context, args: TimerArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(session(ctx, args));
    // The stdin reader thread cannot be cancelled; do not wait for it.
    runtime.shutdown_background();
    result
}

async fn session(ctx: &Context, args: TimerArgs) -> Result<(), Box<dyn std::error::Error>> {
    let history = Arc::new(InMemoryHistory::new());
    let controller = CycleController::new(
        ctx.user,
        ctx.settings.clone(),
        history.clone(),
        Arc::new(ctx.dispatcher()),
    )?;
    let printer = tokio::spawn(print_events(controller.subscribe()));

    println!("{HELP}");
    if args.start {
        controller.start(&args.description).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match execute(&controller, history.as_ref(), ctx.user, line, &args.description).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => eprintln!("error: {e}"),
        }
    }

    controller.stop().await;
    printer.abort();
    Ok(())
}

async fn execute(
    controller: &CycleController,
    history: &dyn HistoryStore,
    user: UserId,
    line: &str,
    default_description: &str,
) -> Result<Flow, Box<dyn std::error::Error>> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "start" => {
            let description = if rest.is_empty() {
                default_description
            } else {
                rest
            };
            if controller.start(description).await?.is_none() {
                println!("timer is already running");
            }
        }
        "pause" => {
            if controller.pause().await.is_none() {
                println!("timer is not running");
            }
        }
        "resume" => {
            if controller.resume().await.is_none() {
                println!("timer is not paused");
            }
        }
        "stop" => {
            controller.stop().await;
        }
        "mode" => {
            let mode: TimerMode = rest.parse()?;
            if controller.select_mode(mode).await.is_none() {
                println!("mode can only change while the timer is idle");
            }
        }
        "status" => {
            controller.refresh_settings().await;
            let snapshot = controller.snapshot().await;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        "history" => {
            let records = history.list(user)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        "delete" => {
            let id: Uuid = rest.parse()?;
            if history.remove(user, id)? {
                println!("deleted {id}");
            } else {
                println!("no session {id}");
            }
        }
        "help" => println!("{HELP}"),
        "quit" | "exit" => return Ok(Flow::Quit),
        other => return Err(format!("unknown command '{other}'; type help").into()),
    }
    Ok(Flow::Continue)
}

async fn print_events(mut events: broadcast::Receiver<Event>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Some(line) = describe(&event) {
                    println!("{line}");
                }
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::TimerStarted {
            mode,
            duration_secs,
            description,
            ..
        } => {
            if description.is_empty() {
                format!("{mode} started ({})", clock(*duration_secs))
            } else {
                format!("{mode} started ({}): {description}", clock(*duration_secs))
            }
        }
        Event::TimerPaused { remaining_secs, .. } => {
            format!("paused with {} left", clock(*remaining_secs))
        }
        Event::TimerResumed { remaining_secs, .. } => {
            format!("resumed with {} left", clock(*remaining_secs))
        }
        // One line per minute is plenty for a terminal.
        Event::TimerTick {
            mode,
            remaining_secs,
        } if remaining_secs % 60 == 0 => format!("{mode}: {} left", clock(*remaining_secs)),
        Event::TimerTick { .. } => return None,
        Event::CycleCompleted {
            mode, next_mode, ..
        } => format!("{mode} finished; next up: {next_mode}"),
        Event::SessionRecorded {
            session_id,
            duration_minutes,
            ..
        } => format!("recorded {duration_minutes} min session {session_id}"),
        Event::TimerStopped { .. } => "stopped".to_string(),
        Event::ModeSelected {
            mode,
            remaining_secs,
            ..
        } => format!("mode {mode} ({})", clock(*remaining_secs)),
    };
    Some(line)
}

fn clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
