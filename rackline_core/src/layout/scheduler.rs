//! Debounced task scheduling on the tokio runtime.
//!
//! [`Debouncer::schedule`] replaces any task that is still waiting out its
//! delay. Once a task's delay has elapsed it is *fired* and is never aborted;
//! fired tasks run one at a time behind an async gate, so a task scheduled
//! while another is running waits for it to finish.

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

const PENDING: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

struct Scheduled {
    state: Arc<AtomicU8>,
    handle: JoinHandle<()>,
}

/// Cancellable, last-write-wins delayed task.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<Scheduled>>,
    gate: Arc<tokio::sync::Mutex<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: Mutex::new(None),
            gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `task` after the quiet period, replacing a pending task.
    ///
    /// Returns `false` (and drops `task`) when called outside a tokio runtime.
    pub fn schedule<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!("no tokio runtime; debounced task not scheduled");
                return false;
            }
        };

        let mut pending = self.pending.lock();
        if let Some(previous) = pending.take() {
            cancel_if_pending(previous);
        }

        let state = Arc::new(AtomicU8::new(PENDING));
        let task_state = state.clone();
        let gate = self.gate.clone();
        let delay = self.delay;
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if task_state
                .compare_exchange(PENDING, FIRED, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return;
            }
            let _running = gate.lock().await;
            task.await;
        });

        *pending = Some(Scheduled { state, handle });
        true
    }

    /// Cancel the pending task, if it has not fired yet.
    pub fn cancel(&self) -> bool {
        match self.pending.lock().take() {
            Some(scheduled) => cancel_if_pending(scheduled),
            None => false,
        }
    }

    /// A task is waiting out its delay
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|s| s.state.load(Ordering::Acquire) == PENDING)
    }

    /// Gate held while a fired task runs; lock it to run work exclusively.
    pub fn gate(&self) -> Arc<tokio::sync::Mutex<()>> {
        self.gate.clone()
    }
}

fn cancel_if_pending(scheduled: Scheduled) -> bool {
    let cancelled = scheduled
        .state
        .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
        .is_ok();
    if cancelled {
        scheduled.handle.abort();
    }
    cancelled
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    fn bump(count: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let count = count.clone();
        async move {
            count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_runs_once() {
        let debouncer = Debouncer::new(Duration::from_secs(2));
        let runs = counter();

        for _ in 0..5 {
            assert!(debouncer.schedule(bump(&runs)));
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_fire() {
        let debouncer = Debouncer::new(Duration::from_secs(2));
        let runs = counter();
        debouncer.schedule(bump(&runs));
        assert!(debouncer.is_pending());

        assert!(debouncer.cancel());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fired_task_is_not_aborted() {
        let debouncer = Debouncer::new(Duration::from_secs(2));
        let finished = counter();

        let done = finished.clone();
        debouncer.schedule(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            done.fetch_add(1, Ordering::SeqCst);
        });

        // Fires at 2s and is still running at 2.5s.
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(!debouncer.cancel());
        debouncer.schedule(bump(&finished));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fired_tasks_run_one_at_a_time() {
        let debouncer = Debouncer::new(Duration::from_secs(1));
        let running = counter();
        let max_running = counter();

        for _ in 0..2 {
            let running = running.clone();
            let max_running = max_running.clone();
            debouncer.schedule(async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                max_running.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            });
            // Let the first task fire before scheduling the second.
            tokio::time::sleep(Duration::from_millis(1500)).await;
        }

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(max_running.load(Ordering::SeqCst), 1);
        assert_eq!(running.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_runtime_skips() {
        let debouncer = Debouncer::new(Duration::from_secs(2));
        assert!(!debouncer.schedule(async {}));
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending() {
        let runs = counter();
        {
            let debouncer = Debouncer::new(Duration::from_secs(2));
            debouncer.schedule(bump(&runs));
        }
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
