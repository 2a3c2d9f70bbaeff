//! A deferred callback that can be cancelled or replaced before it fires
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

/// An owned handle to at most one pending callback. Scheduling a new callback
/// replaces the pending one, and dropping the timer cancels it.
///
/// Callbacks run on the tokio runtime, so [Timer::schedule()] must be called
/// from within a runtime context.
#[derive(Debug, Default)]
pub struct Timer {
    handle: Option<JoinHandle<()>>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` after `delay`, cancelling any callback that is still pending
    pub fn schedule<F>(&mut self, delay: Duration, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        trace!(?delay, "scheduling timer");
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            f();
        }));
    }

    /// Cancel the pending callback, if any. Returns true if a callback was
    /// still pending.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) if !handle.is_finished() => {
                trace!("cancelling pending timer");
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use test_log::test;
    use tokio::time::sleep;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Box<dyn FnOnce() + Send>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let make = move || {
            let c = c.clone();
            Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }) as Box<dyn FnOnce() + Send>
        };
        (count, make)
    }

    #[test(tokio::test(start_paused = true))]
    async fn test_fires_after_delay() {
        let (count, make) = counter();
        let mut timer = Timer::new();
        timer.schedule(Duration::from_millis(100), make());
        assert!(timer.is_pending());
        sleep(Duration::from_millis(99)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        sleep(Duration::from_millis(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!timer.is_pending());
        assert!(!timer.cancel());
    }

    #[test(tokio::test(start_paused = true))]
    async fn test_schedule_replaces_pending() {
        let (count, make) = counter();
        let mut timer = Timer::new();
        timer.schedule(Duration::from_millis(100), make());
        sleep(Duration::from_millis(50)).await;
        timer.schedule(Duration::from_millis(100), make());
        sleep(Duration::from_millis(75)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        sleep(Duration::from_millis(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test(tokio::test(start_paused = true))]
    async fn test_cancel_and_drop() {
        let (count, make) = counter();
        let mut timer = Timer::new();
        timer.schedule(Duration::from_millis(100), make());
        assert!(timer.cancel());
        assert!(!timer.is_pending());

        let mut dropped = Timer::new();
        dropped.schedule(Duration::from_millis(100), make());
        drop(dropped);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
