use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, warn};

use super::machine::{CycleCompletion, CycleMachine, TickOutcome, TimerMode, TimerSnapshot};
use super::ticker::{spawn_ticker, TickFlow, TickerHandle};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::history::{HistoryStore, NewSession};
use crate::notify::NotificationDispatcher;
use crate::settings::{CycleDurations, SettingsProvider};
use crate::user::UserId;

const EVENT_BUFFER: usize = 256;

/// Drives one user's cycle: owns the state machine, its ticker, and the
/// side effects of a completed countdown.
///
/// Cloning is cheap; clones share the same cycle.
#[derive(Clone)]
pub struct CycleController {
    inner: Arc<Inner>,
}

/// The live ticker, plus progress carried across a pause.
#[derive(Default)]
struct TickerSlot {
    armed: Option<Armed>,
    carried: Duration,
}

struct Armed {
    handle: TickerHandle,
    /// Remaining seconds when the ticker was spawned.
    remaining_secs: u64,
}

impl Armed {
    /// Time measured by the ticker that the machine has not counted yet.
    fn uncounted(&self, remaining_secs: u64) -> Duration {
        let counted = self.remaining_secs.saturating_sub(remaining_secs);
        self.handle
            .measured()
            .saturating_sub(Duration::from_secs(counted))
    }
}

struct Inner {
    user: UserId,
    machine: Mutex<CycleMachine>,
    ticker: StdMutex<TickerSlot>,
    tick_period: Duration,
    settings: Arc<SettingsProvider>,
    history: Arc<dyn HistoryStore>,
    dispatcher: Arc<NotificationDispatcher>,
    events: broadcast::Sender<Event>,
}

impl CycleController {
    pub fn new(
        user: UserId,
        settings: Arc<SettingsProvider>,
        history: Arc<dyn HistoryStore>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Result<Self> {
        let durations = settings.timer_settings(user)?.durations();
        let (events, _) = broadcast::channel(EVENT_BUFFER);

        Ok(Self {
            inner: Arc::new(Inner {
                user,
                machine: Mutex::new(CycleMachine::new(&durations)),
                ticker: StdMutex::new(TickerSlot::default()),
                tick_period: Duration::from_secs(1),
                settings,
                history,
                dispatcher,
                events,
            }),
        })
    }

    pub fn user(&self) -> UserId {
        self.inner.user
    }

    /// Receive every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe()
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        self.inner.machine.lock().await.snapshot()
    }

    /// Whether a ticker is currently scheduled.
    pub fn ticker_active(&self) -> bool {
        self.inner
            .slot()
            .armed
            .as_ref()
            .is_some_and(|armed| armed.handle.is_active())
    }

    /// Start a run of the current mode. `Ok(None)` if one is already active.
    pub async fn start(&self, description: &str) -> Result<Option<Event>> {
        let durations = self.inner.durations();
        let mut machine = self.inner.machine.lock().await;
        let Some(event) = machine.start(description, Utc::now(), &durations)? else {
            return Ok(None);
        };
        self.arm(machine.epoch(), machine.remaining_secs(), Duration::ZERO);
        drop(machine);

        debug!(user = %self.inner.user, ?event, "timer started");
        self.inner.publish(event.clone());
        Ok(Some(event))
    }

    pub async fn pause(&self) -> Option<Event> {
        let mut machine = self.inner.machine.lock().await;
        let event = machine.pause()?;
        self.inner.park_ticker(machine.remaining_secs());
        drop(machine);

        self.inner.publish(event.clone());
        Some(event)
    }

    pub async fn resume(&self) -> Option<Event> {
        let mut machine = self.inner.machine.lock().await;
        let event = machine.resume()?;
        let carried = std::mem::take(&mut self.inner.slot().carried);
        self.arm(machine.epoch(), machine.remaining_secs(), carried);
        drop(machine);

        self.inner.publish(event.clone());
        Some(event)
    }

    /// Abandon the current run and reset to an idle focus interval.
    pub async fn stop(&self) -> Event {
        let durations = self.inner.durations();
        let mut machine = self.inner.machine.lock().await;
        let event = machine.stop(&durations);
        self.inner.cancel_ticker();
        drop(machine);

        debug!(user = %self.inner.user, "timer stopped");
        self.inner.publish(event.clone());
        event
    }

    /// Switch mode while idle. `None` while a run is active.
    pub async fn select_mode(&self, mode: TimerMode) -> Option<Event> {
        let durations = self.inner.durations();
        let event = self.inner.machine.lock().await.select_mode(mode, &durations)?;
        self.inner.publish(event.clone());
        Some(event)
    }

    /// Pick up changed timer settings. Only an idle countdown is affected.
    pub async fn refresh_settings(&self) -> bool {
        let durations = self.inner.durations();
        self.inner.machine.lock().await.refresh(&durations)
    }

    fn arm(&self, epoch: u64, remaining_secs: u64, carried: Duration) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let handle = spawn_ticker(self.inner.tick_period, carried, move |elapsed| {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(inner) => inner.on_tick(epoch, elapsed).await,
                    None => TickFlow::Stop,
                }
            }
        });

        let previous = self.inner.slot().armed.replace(Armed {
            handle,
            remaining_secs,
        });
        if let Some(previous) = previous {
            previous.handle.cancel();
        }
    }
}

impl Inner {
    /// Current durations, falling back to defaults if settings are unreadable.
    fn durations(&self) -> CycleDurations {
        match self.settings.timer_settings(self.user) {
            Ok(settings) => settings.durations(),
            Err(err) => {
                warn!(user = %self.user, error = %err, "timer settings unavailable, using defaults");
                CycleDurations::default()
            }
        }
    }

    fn publish(&self, event: Event) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    fn slot(&self) -> MutexGuard<'_, TickerSlot> {
        self.ticker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop the ticker and any carried progress.
    fn take_ticker(&self) -> Option<TickerHandle> {
        let mut slot = self.slot();
        slot.carried = Duration::ZERO;
        slot.armed.take().map(|armed| armed.handle)
    }

    fn cancel_ticker(&self) {
        if let Some(handle) = self.take_ticker() {
            handle.cancel();
        }
    }

    /// Cancel the ticker and keep the time it measured but the machine never
    /// counted, for the next resume. Call with the machine lock held.
    fn park_ticker(&self, remaining_secs: u64) {
        let mut slot = self.slot();
        if let Some(armed) = slot.armed.take() {
            slot.carried = armed.uncounted(remaining_secs);
            armed.handle.cancel();
        }
    }

    async fn on_tick(&self, epoch: u64, elapsed: u64) -> TickFlow {
        let durations = self.durations();
        let mut machine = self.machine.lock().await;

        match machine.tick(epoch, elapsed, Utc::now(), &durations) {
            None if machine.epoch() != epoch => TickFlow::Stop,
            None => TickFlow::Continue,
            Some(TickOutcome::Counted { remaining_secs }) => {
                self.publish(Event::TimerTick {
                    mode: machine.mode(),
                    remaining_secs,
                });
                TickFlow::Continue
            }
            Some(TickOutcome::Completed(completion)) => {
                self.complete(completion);
                TickFlow::Stop
            }
        }
    }

    /// Runs with the machine lock held, so no command can interleave with
    /// the completion's side effects.
    fn complete(&self, completion: CycleCompletion) {
        if let Some(focus) = &completion.session {
            let recorded = NewSession::new(
                focus.description.clone(),
                focus.started_at,
                i64::from(focus.duration_minutes),
            )
            .map_err(CoreError::from)
            .and_then(|session| self.history.append(self.user, session));

            match recorded {
                Ok(record) => self.publish(Event::SessionRecorded {
                    session_id: record.session_id,
                    duration_minutes: record.duration_minutes,
                    at: completion.at,
                }),
                Err(err) => {
                    error!(user = %self.user, error = %err, "failed to record completed session");
                }
            }
        }

        let dispatcher = Arc::clone(&self.dispatcher);
        let user = self.user;
        let event = completion.notification;
        tokio::task::spawn_blocking(move || {
            dispatcher.trigger(user, event);
        });

        if let Some(handle) = self.take_ticker() {
            handle.disarm();
        }

        debug!(
            user = %self.user,
            finished = %completion.finished,
            next = %completion.next,
            "cycle advanced"
        );
        self.publish(completion.event());
    }
}
