//! # Timer
//!
//! The round driver's only suspension point. `invoke_after_delay`
//! schedules a future callback; `deny` cancels whatever was scheduled,
//! idempotently. Grounded in this codebase's `tokio::select!`
//! cancellable-sleep pattern (see `consensus_loop.rs`'s shutdown-aware
//! run loop) rather than the original's RxCpp `composite_subscription`.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Duration;

/// A cancellable, re-armable delayed callback.
///
/// `invoke_after_delay` denies any previously scheduled callback before
/// arming a new one — exactly one callback is ever pending per `Timer`.
/// `deny` is safe to call any number of times, including when nothing is
/// scheduled.
pub struct Timer {
    delay: Duration,
    cancel: Mutex<Option<watch::Sender<()>>>,
}

impl Timer {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            cancel: Mutex::new(None),
        })
    }

    /// Cancels whatever is currently scheduled, then spawns a task that
    /// invokes `handler` after this timer's delay, unless cancelled
    /// first by a subsequent `invoke_after_delay` or `deny` call.
    pub fn invoke_after_delay<F>(self: &Arc<Self>, handler: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.deny();

        let (tx, mut rx) = watch::channel(());
        *self.cancel.lock() = Some(tx);

        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    handler();
                }
                _ = rx.changed() => {
                    // Denied before firing.
                }
            }
        });
    }

    /// Idempotent cancellation of any pending callback.
    pub fn deny(&self) {
        // Dropping the sender makes `rx.changed()` resolve immediately
        // in the spawned task; taking it out of the mutex first keeps
        // the critical section tiny and lock-free of the async sleep.
        self.cancel.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay_when_not_denied() {
        let timer = Timer::new(Duration::from_millis(50));
        let fired = Arc::new(AtomicBool::new(false));
        let fired_clone = Arc::clone(&fired);

        timer.invoke_after_delay(move || fired_clone.store(true, Ordering::SeqCst));

        tokio::time::advance(Duration::from_millis(60)).await;
        tokio::task::yield_now().await;

        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn deny_prevents_the_callback() {
        let timer = Timer::new(Duration::from_millis(50));
        let fired = Arc::new(AtomicBool::new(false));
        let fired_clone = Arc::clone(&fired);

        timer.invoke_after_delay(move || fired_clone.store(true, Ordering::SeqCst));
        timer.deny();

        tokio::time::advance(Duration::from_millis(60)).await;
        tokio::task::yield_now().await;

        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_cancels_the_previous_callback() {
        let timer = Timer::new(Duration::from_millis(50));
        let first_fired = Arc::new(AtomicBool::new(false));
        let second_fired = Arc::new(AtomicBool::new(false));

        let first_clone = Arc::clone(&first_fired);
        timer.invoke_after_delay(move || first_clone.store(true, Ordering::SeqCst));

        let second_clone = Arc::clone(&second_fired);
        timer.invoke_after_delay(move || second_clone.store(true, Ordering::SeqCst));

        tokio::time::advance(Duration::from_millis(60)).await;
        tokio::task::yield_now().await;

        assert!(!first_fired.load(Ordering::SeqCst));
        assert!(second_fired.load(Ordering::SeqCst));
    }

    #[test]
    fn deny_without_a_pending_callback_does_not_panic() {
        let timer = Timer::new(Duration::from_millis(10));
        timer.deny();
        timer.deny();
    }
}
