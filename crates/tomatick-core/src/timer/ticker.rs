use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Whether the ticker should keep running after a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFlow {
    Continue,
    Stop,
}

/// Owner of a running ticker task.
///
/// Dropping the handle cancels the token, so the task exits at its next
/// wakeup.
#[derive(Debug)]
pub struct TickerHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
    origin: Instant,
    carried: Duration,
}

impl TickerHandle {
    /// Stop the ticker now, including any callback in flight.
    pub fn cancel(self) {
        self.token.cancel();
        self.task.abort();
    }

    /// Time measured by this ticker, including the progress it was started
    /// with.
    pub fn measured(&self) -> Duration {
        self.carried + self.origin.elapsed()
    }

    /// Stop future wakeups but let the current callback finish. Used from
    /// inside the callback itself.
    pub fn disarm(self) {
        self.token.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled() && !self.task.is_finished()
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Spawn a task that wakes every `period` and reports the whole seconds
/// elapsed since the previous report.
///
/// `carried` is progress left over from an earlier ticker (a paused run); it
/// counts toward the first report, which is scheduled early by that amount.
/// Elapsed time is measured against the spawn instant, so a late wakeup
/// reports the seconds it missed instead of losing them.
pub fn spawn_ticker<F, Fut>(period: Duration, carried: Duration, mut on_tick: F) -> TickerHandle
where
    F: FnMut(u64) -> Fut + Send + 'static,
    Fut: Future<Output = TickFlow> + Send + 'static,
{
    let token = CancellationToken::new();
    let cancelled = token.clone();
    let origin = Instant::now();

    let task = tokio::spawn(async move {
        let first = origin + period.saturating_sub(carried);
        let mut interval = time::interval_at(first, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut reported = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => break,
                _ = interval.tick() => {
                    let elapsed = (carried + origin.elapsed()).as_secs();
                    let delta = elapsed.saturating_sub(reported);
                    if delta == 0 {
                        continue;
                    }
                    reported = elapsed;
                    if on_tick(delta).await == TickFlow::Stop {
                        break;
                    }
                }
            }
        }
    });

    TickerHandle {
        token,
        task,
        origin,
        carried,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn reports_one_second_per_tick() {
        let total = Arc::new(AtomicU64::new(0));
        let counter = total.clone();
        let handle = spawn_ticker(Duration::from_secs(1), Duration::ZERO, move |elapsed| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(elapsed, Ordering::SeqCst);
                TickFlow::Continue
            }
        });

        time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(total.load(Ordering::SeqCst), 5);
        assert!(handle.is_active());

        handle.cancel();
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(total.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_task() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let handle = spawn_ticker(Duration::from_secs(1), Duration::ZERO, move |_| {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 2 {
                    TickFlow::Stop
                } else {
                    TickFlow::Continue
                }
            }
        });

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(!handle.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_ticking() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let handle = spawn_ticker(Duration::from_secs(1), Duration::ZERO, move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                TickFlow::Continue
            }
        });

        time::sleep(Duration::from_millis(2_500)).await;
        drop(handle);
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn carried_progress_shortens_the_first_tick() {
        let total = Arc::new(AtomicU64::new(0));
        let counter = total.clone();
        let handle = spawn_ticker(Duration::from_secs(1), Duration::from_millis(700), move |elapsed| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(elapsed, Ordering::SeqCst);
                TickFlow::Continue
            }
        });

        time::sleep(Duration::from_millis(400)).await;
        assert_eq!(total.load(Ordering::SeqCst), 1);
        assert_eq!(handle.measured(), Duration::from_millis(1_100));

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(total.load(Ordering::SeqCst), 2);
        handle.cancel();
    }
}
