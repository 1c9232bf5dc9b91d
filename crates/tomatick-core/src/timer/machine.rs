//! Focus/break cycle state machine.
//!
//! The machine has no clock and no thread. The controller feeds it elapsed
//! seconds and the current durations; every command returns the event it
//! produced, or `None` when the command does not apply in the current state.
//!
//! ```text
//! Idle --start--> Running --pause--> Paused --resume--> Running
//! Running --(remaining == 0)--> Idle (next mode)
//! any --stop--> Idle (focus)
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::sanitize::clean_description;
use crate::error::ValidationError;
use crate::events::Event;
use crate::notify::CycleEvent;
use crate::settings::CycleDurations;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::Focus => "focus",
            TimerMode::ShortBreak => "shortBreak",
            TimerMode::LongBreak => "longBreak",
        }
    }

    pub fn is_break(self) -> bool {
        !matches!(self, TimerMode::Focus)
    }

    /// Configured length of this mode in minutes.
    pub fn minutes(self, durations: &CycleDurations) -> u32 {
        match self {
            TimerMode::Focus => durations.focus_min,
            TimerMode::ShortBreak => durations.short_break_min,
            TimerMode::LongBreak => durations.long_break_min,
        }
    }

    pub fn duration_secs(self, durations: &CycleDurations) -> u64 {
        u64::from(self.minutes(durations)) * 60
    }

    /// Mode entered automatically when this one runs out.
    pub fn next(self) -> TimerMode {
        match self {
            TimerMode::Focus => TimerMode::ShortBreak,
            TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Focus,
        }
    }

    /// Notification announcing the end of this mode.
    pub fn end_event(self) -> CycleEvent {
        if self.is_break() {
            CycleEvent::EndBreak
        } else {
            CycleEvent::EndFocus
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(TimerMode::Focus),
            "shortBreak" | "short-break" | "short" => Ok(TimerMode::ShortBreak),
            "longBreak" | "long-break" | "long" => Ok(TimerMode::LongBreak),
            other => Err(format!("unknown timer mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

/// Focus interval that ran to zero and should become a history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedFocus {
    pub description: String,
    pub started_at: DateTime<Utc>,
    /// Focus length in force when the run started.
    pub duration_minutes: u32,
}

/// Side effects owed after a countdown reached zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleCompletion {
    pub finished: TimerMode,
    pub next: TimerMode,
    pub notification: CycleEvent,
    pub session: Option<CompletedFocus>,
    pub at: DateTime<Utc>,
}

impl CycleCompletion {
    pub fn event(&self) -> Event {
        Event::CycleCompleted {
            mode: self.finished,
            next_mode: self.next,
            notification: self.notification,
            at: self.at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Counted { remaining_secs: u64 },
    Completed(CycleCompletion),
}

/// Read-only view of the machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub mode: TimerMode,
    pub status: TimerStatus,
    pub remaining_seconds: u64,
    pub description: String,
    pub session_start: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CycleMachine {
    mode: TimerMode,
    status: TimerStatus,
    remaining_secs: u64,
    description: String,
    started_at: Option<DateTime<Utc>>,
    run_minutes: u32,
    /// Bumped whenever a run starts, stops or changes status. Ticks carry
    /// the epoch they were scheduled under; mismatches are ignored.
    epoch: u64,
}

impl CycleMachine {
    pub fn new(durations: &CycleDurations) -> Self {
        Self {
            mode: TimerMode::Focus,
            status: TimerStatus::Idle,
            remaining_secs: TimerMode::Focus.duration_secs(durations),
            description: String::new(),
            started_at: None,
            run_minutes: 0,
            epoch: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            mode: self.mode,
            status: self.status,
            remaining_seconds: self.remaining_secs,
            description: self.description.clone(),
            session_start: self.started_at,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Switch mode. Only allowed while idle.
    pub fn select_mode(&mut self, mode: TimerMode, durations: &CycleDurations) -> Option<Event> {
        if self.status != TimerStatus::Idle {
            debug!(requested = %mode, status = ?self.status, "mode change rejected while active");
            return None;
        }
        self.mode = mode;
        self.remaining_secs = mode.duration_secs(durations);
        Some(Event::ModeSelected {
            mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Recompute the idle countdown after a settings change. Active runs
    /// keep the duration they started with.
    pub fn refresh(&mut self, durations: &CycleDurations) -> bool {
        if self.status != TimerStatus::Idle {
            return false;
        }
        let secs = self.mode.duration_secs(durations);
        let changed = secs != self.remaining_secs;
        self.remaining_secs = secs;
        changed
    }

    /// Begin a run of the current mode.
    ///
    /// Returns `Ok(None)` if a run is already active. The description is
    /// sanitized first and rejected if still too long.
    pub fn start(
        &mut self,
        description: &str,
        now: DateTime<Utc>,
        durations: &CycleDurations,
    ) -> Result<Option<Event>, ValidationError> {
        if self.status != TimerStatus::Idle {
            return Ok(None);
        }
        let description = clean_description(description)?;

        self.status = TimerStatus::Running;
        self.remaining_secs = self.mode.duration_secs(durations);
        self.run_minutes = self.mode.minutes(durations);
        self.started_at = Some(now);
        self.description = description;
        self.epoch += 1;

        Ok(Some(Event::TimerStarted {
            mode: self.mode,
            duration_secs: self.remaining_secs,
            description: self.description.clone(),
            at: now,
        }))
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.status != TimerStatus::Running {
            return None;
        }
        self.status = TimerStatus::Paused;
        self.epoch += 1;
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.status != TimerStatus::Paused {
            return None;
        }
        self.status = TimerStatus::Running;
        self.epoch += 1;
        Some(Event::TimerResumed {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Hard reset to an idle focus interval. Nothing is recorded.
    pub fn stop(&mut self, durations: &CycleDurations) -> Event {
        self.mode = TimerMode::Focus;
        self.status = TimerStatus::Idle;
        self.remaining_secs = TimerMode::Focus.duration_secs(durations);
        self.description.clear();
        self.started_at = None;
        self.epoch += 1;
        Event::TimerStopped { at: Utc::now() }
    }

    /// Apply `elapsed_secs` of wall-clock time to the run scheduled under
    /// `epoch`.
    ///
    /// Stale epochs and non-running states are ignored. When the countdown
    /// reaches zero the machine advances to the next mode and returns what
    /// the caller owes: a history entry (focus only) and a notification.
    pub fn tick(
        &mut self,
        epoch: u64,
        elapsed_secs: u64,
        now: DateTime<Utc>,
        durations: &CycleDurations,
    ) -> Option<TickOutcome> {
        if epoch != self.epoch || self.status != TimerStatus::Running || elapsed_secs == 0 {
            return None;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(elapsed_secs);
        if self.remaining_secs > 0 {
            return Some(TickOutcome::Counted {
                remaining_secs: self.remaining_secs,
            });
        }

        Some(TickOutcome::Completed(self.complete(now, durations)))
    }

    fn complete(&mut self, now: DateTime<Utc>, durations: &CycleDurations) -> CycleCompletion {
        let finished = self.mode;
        let description = std::mem::take(&mut self.description);
        let session = match (finished, self.started_at.take()) {
            (TimerMode::Focus, Some(started_at)) => Some(CompletedFocus {
                description,
                started_at,
                duration_minutes: self.run_minutes,
            }),
            _ => None,
        };

        let next = finished.next();
        self.mode = next;
        self.status = TimerStatus::Idle;
        self.remaining_secs = next.duration_secs(durations);
        self.epoch += 1;

        debug!(%finished, %next, "cycle completed");
        CycleCompletion {
            finished,
            next,
            notification: finished.end_event(),
            session,
            at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn durations() -> CycleDurations {
        CycleDurations::default()
    }

    fn running(description: &str) -> CycleMachine {
        let mut machine = CycleMachine::new(&durations());
        machine.start(description, Utc::now(), &durations()).unwrap();
        machine
    }

    #[test]
    fn new_machine_is_idle_focus() {
        let machine = CycleMachine::new(&durations());
        assert_eq!(machine.mode(), TimerMode::Focus);
        assert_eq!(machine.status(), TimerStatus::Idle);
        assert_eq!(machine.remaining_secs(), 1500);
    }

    #[test]
    fn start_captures_description_and_duration() {
        let mut machine = CycleMachine::new(&durations());
        let event = machine
            .start("<i>draft</i> chapter", Utc::now(), &durations())
            .unwrap()
            .unwrap();

        assert!(matches!(event, Event::TimerStarted { duration_secs: 1500, .. }));
        assert_eq!(machine.status(), TimerStatus::Running);
        assert_eq!(machine.description(), "draft chapter");
        assert!(machine.snapshot().session_start.is_some());
    }

    #[test]
    fn start_while_running_is_a_no_op() {
        let mut machine = running("a");
        let epoch = machine.epoch();
        assert_eq!(machine.start("b", Utc::now(), &durations()), Ok(None));
        assert_eq!(machine.description(), "a");
        assert_eq!(machine.epoch(), epoch);
    }

    #[test]
    fn over_long_description_leaves_machine_idle() {
        let mut machine = CycleMachine::new(&durations());
        assert!(machine
            .start(&"x".repeat(101), Utc::now(), &durations())
            .is_err());
        assert_eq!(machine.status(), TimerStatus::Idle);
    }

    #[test]
    fn mode_changes_only_while_idle() {
        let mut machine = running("");
        assert_eq!(machine.select_mode(TimerMode::LongBreak, &durations()), None);
        assert_eq!(machine.mode(), TimerMode::Focus);

        machine.pause();
        assert_eq!(machine.select_mode(TimerMode::LongBreak, &durations()), None);

        machine.stop(&durations());
        assert!(machine.select_mode(TimerMode::LongBreak, &durations()).is_some());
        assert_eq!(machine.remaining_secs(), 15 * 60);
    }

    #[test]
    fn ticks_count_down_and_ignore_stale_epochs() {
        let mut machine = running("");
        let epoch = machine.epoch();

        assert_eq!(
            machine.tick(epoch, 1, Utc::now(), &durations()),
            Some(TickOutcome::Counted { remaining_secs: 1499 })
        );
        assert_eq!(machine.tick(epoch - 1, 1, Utc::now(), &durations()), None);

        machine.pause();
        assert_eq!(machine.tick(epoch, 1, Utc::now(), &durations()), None);
        assert_eq!(machine.remaining_secs(), 1499);

        machine.resume();
        assert_eq!(machine.tick(epoch, 1, Utc::now(), &durations()), None);
        let resumed = machine.epoch();
        machine.tick(resumed, 9, Utc::now(), &durations());
        assert_eq!(machine.remaining_secs(), 1490);
    }

    #[test]
    fn focus_completion_owes_a_session_and_advances_to_short_break() {
        let started = Utc::now();
        let mut machine = CycleMachine::new(&durations());
        machine.start("essay", started, &durations()).unwrap();

        let outcome = machine.tick(machine.epoch(), 1500, Utc::now(), &durations());
        let Some(TickOutcome::Completed(completion)) = outcome else {
            panic!("expected completion");
        };

        assert_eq!(completion.notification, CycleEvent::EndFocus);
        assert_eq!(completion.next, TimerMode::ShortBreak);
        assert_eq!(
            completion.session,
            Some(CompletedFocus {
                description: "essay".into(),
                started_at: started,
                duration_minutes: 25,
            })
        );
        assert_eq!(machine.status(), TimerStatus::Idle);
        assert_eq!(machine.mode(), TimerMode::ShortBreak);
        assert_eq!(machine.remaining_secs(), 300);
        assert_eq!(machine.description(), "");
    }

    #[test]
    fn break_completion_returns_to_focus_without_session() {
        let mut machine = CycleMachine::new(&durations());
        machine.select_mode(TimerMode::LongBreak, &durations());
        machine.start("", Utc::now(), &durations()).unwrap();

        let outcome = machine.tick(machine.epoch(), 15 * 60, Utc::now(), &durations());
        let Some(TickOutcome::Completed(completion)) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(completion.notification, CycleEvent::EndBreak);
        assert!(completion.session.is_none());
        assert_eq!(machine.mode(), TimerMode::Focus);
    }

    #[test]
    fn recorded_duration_is_the_one_captured_at_start() {
        let mut machine = CycleMachine::new(&durations());
        machine.start("", Utc::now(), &durations()).unwrap();

        let longer = CycleDurations {
            focus_min: 50,
            ..durations()
        };
        // A settings change mid-run does not touch the countdown.
        assert!(!machine.refresh(&longer));

        let outcome = machine.tick(machine.epoch(), 1500, Utc::now(), &longer);
        let Some(TickOutcome::Completed(completion)) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(completion.session.map(|s| s.duration_minutes), Some(25));
    }

    #[test]
    fn stop_resets_to_focus() {
        let mut machine = CycleMachine::new(&durations());
        machine.select_mode(TimerMode::ShortBreak, &durations());
        machine.start("break", Utc::now(), &durations()).unwrap();
        machine.stop(&durations());

        assert_eq!(machine.mode(), TimerMode::Focus);
        assert_eq!(machine.status(), TimerStatus::Idle);
        assert_eq!(machine.remaining_secs(), 1500);
        assert_eq!(machine.description(), "");
    }

    #[test]
    fn idle_refresh_picks_up_new_durations() {
        let mut machine = CycleMachine::new(&durations());
        let shorter = CycleDurations {
            focus_min: 10,
            ..durations()
        };
        assert!(machine.refresh(&shorter));
        assert_eq!(machine.remaining_secs(), 600);
    }
}
