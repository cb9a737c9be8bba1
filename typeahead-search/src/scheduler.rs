//! Timer and task scheduling abstraction.
//!
//! The orchestrator never touches a runtime directly; it asks a
//! [`Scheduler`] to run work later (debounce), periodically (cache sweep)
//! or in the background (backend calls). Every scheduled timer returns a
//! [`TaskHandle`] that cancels it.
//!
//! Implementations must never run a task inline from inside the scheduling
//! call: callers hold the session lock while scheduling.

use std::time::Duration;

use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::{Result, SearchError};

/// One-shot callback.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Callback run on every tick of a periodic timer.
pub type RepeatingTask = Box<dyn FnMut() + Send + 'static>;

/// Cancels a scheduled timer. Cancelling twice is harmless.
#[derive(Debug, Clone, Default)]
pub struct TaskHandle {
    cancel: CancellationToken,
}

impl TaskHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Something that can run callbacks after a delay, periodically, or in
/// the background.
pub trait Scheduler: Send + Sync + 'static {
    /// Run `task` once after `delay`, unless cancelled first.
    fn schedule_after(&self, delay: Duration, task: Task) -> TaskHandle;

    /// Run `task` every `period`, first after one full period.
    fn schedule_every(&self, period: Duration, task: RepeatingTask) -> TaskHandle;

    /// Drive `future` to completion in the background.
    fn spawn(&self, future: BoxFuture<'static, ()>);
}

/// [`Scheduler`] backed by a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime the caller is running on.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] when called outside a tokio runtime.
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| SearchError::Config(format!("no tokio runtime: {e}")))
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle::default();
        let cancel = handle.cancel.clone();
        self.handle.spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => task(),
            }
        });
        handle
    }

    fn schedule_every(&self, period: Duration, mut task: RepeatingTask) -> TaskHandle {
        let handle = TaskHandle::default();
        let cancel = handle.cancel.clone();
        self.handle.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => task(),
                }
            }
        });
        handle
    }

    fn spawn(&self, future: BoxFuture<'static, ()>) {
        self.handle.spawn(future);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> usize) {
        let count = Arc::new(AtomicUsize::new(0));
        let read = Arc::clone(&count);
        (count, move || read.load(Ordering::SeqCst))
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_after_fires_once() {
        let scheduler = TokioScheduler::current().expect("runtime");
        let (count, read) = counter();
        scheduler.schedule_after(
            Duration::from_millis(100),
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert_eq!(read(), 0);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(read(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let scheduler = TokioScheduler::current().expect("runtime");
        let (count, read) = counter();
        let handle = scheduler.schedule_after(
            Duration::from_millis(100),
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );
        handle.cancel();
        assert!(handle.is_cancelled());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(read(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_every_ticks_until_cancelled() {
        let scheduler = TokioScheduler::current().expect("runtime");
        let (count, read) = counter();
        let handle = scheduler.schedule_every(
            Duration::from_secs(60),
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(read(), 0);
        tokio::time::sleep(Duration::from_secs(151)).await;
        assert_eq!(read(), 3);

        handle.cancel();
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(read(), 3);
    }

    #[tokio::test]
    async fn spawn_runs_future() {
        let scheduler = TokioScheduler::current().expect("runtime");
        let (tx, rx) = tokio::sync::oneshot::channel();
        scheduler.spawn(Box::pin(async move {
            let _ = tx.send(42);
        }));
        assert_eq!(rx.await.expect("spawned future ran"), 42);
    }

    #[test]
    fn current_outside_runtime_is_error() {
        let err = TokioScheduler::current().unwrap_err();
        assert!(err.to_string().contains("no tokio runtime"));
    }
}
