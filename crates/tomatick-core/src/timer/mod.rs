//! Focus/break cycle: the pure state machine, the one-second ticker that
//! drives it, and the controller that wires completions to history and
//! notifications.

mod controller;
mod machine;
mod sanitize;
mod ticker;

pub use controller::CycleController;
pub use machine::{
    CompletedFocus, CycleCompletion, CycleMachine, TickOutcome, TimerMode, TimerSnapshot,
    TimerStatus,
};
pub use sanitize::{clean_description, sanitize_description};
pub use ticker::{spawn_ticker, TickFlow, TickerHandle};
