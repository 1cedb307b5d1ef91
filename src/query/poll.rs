//! Recurring background reads
//!
//! A `Poller` runs a fetch on a tokio task and publishes each outcome on a
//! watch channel. The delay before the next fetch is chosen from the last
//! outcome, which gives the fast-while-active / slow-while-idle cadence.
//! Dropping the poller stops the task.

use crate::api::ApiError;
use crate::config::PollingConfig;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Result of one poll
pub type PollOutcome<T> = Result<Arc<T>, ApiError>;

/// Fast and slow polling intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollCadence {
    pub active: Duration,
    pub idle: Duration,
}

impl PollCadence {
    pub fn delay(&self, active: bool) -> Duration {
        if active {
            self.active
        } else {
            self.idle
        }
    }
}

impl From<&PollingConfig> for PollCadence {
    fn from(config: &PollingConfig) -> Self {
        Self {
            active: Duration::from_millis(config.running_interval_ms),
            idle: Duration::from_millis(config.idle_interval_ms),
        }
    }
}

impl Default for PollCadence {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

pub struct Poller<T> {
    rx: watch::Receiver<Option<PollOutcome<T>>>,
    handle: JoinHandle<()>,
}

impl<T> Poller<T>
where
    T: Send + Sync + 'static,
{
    /// Starts polling immediately
    ///
    /// # Arguments
    ///
    /// * `fetch` - Issues one read
    /// * `next_delay` - Picks the pause after an outcome
    pub fn spawn<F, Fut, D>(fetch: F, next_delay: D) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = PollOutcome<T>> + Send + 'static,
        D: Fn(&PollOutcome<T>) -> Duration + Send + 'static,
    {
        let (tx, rx) = watch::channel(None);

        let handle = tokio::spawn(async move {
            loop {
                let outcome = fetch().await;
                let delay = next_delay(&outcome);
                let fatal = matches!(&outcome, Err(e) if e.is_fatal());

                if tx.send(Some(outcome)).is_err() {
                    break;
                }
                if fatal {
                    tracing::warn!("Polling stopped: session rejected");
                    break;
                }

                tracing::trace!("next poll in {:?}", delay);
                tokio::time::sleep(delay).await;
            }
        });

        Self { rx, handle }
    }

    /// Most recent outcome, if any poll has completed
    pub fn latest(&self) -> Option<PollOutcome<T>> {
        self.rx.borrow().clone()
    }

    /// Waits for the next outcome
    ///
    /// Returns None once polling has stopped.
    pub async fn next(&mut self) -> Option<PollOutcome<T>> {
        self.rx.changed().await.ok()?;
        self.rx.borrow_and_update().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_outcomes_are_published() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let mut poller = Poller::spawn(
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok(Arc::new(n)) }
            },
            |_| Duration::from_millis(5),
        );

        let first = poller.next().await.unwrap().unwrap();
        let second = poller.next().await.unwrap().unwrap();
        assert!(*second > *first);
        assert!(poller.latest().is_some());
    }

    #[tokio::test]
    async fn test_delay_follows_outcome() {
        let cadence = PollCadence {
            active: Duration::from_millis(1),
            idle: Duration::from_secs(3600),
        };
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let mut poller = Poller::spawn(
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok(Arc::new(n)) }
            },
            // Active for the first two polls, then idle
            move |outcome: &PollOutcome<u32>| {
                cadence.delay(matches!(outcome, Ok(n) if **n < 2))
            },
        );

        for _ in 0..3 {
            poller.next().await.unwrap().unwrap();
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unauthorized_stops_polling() {
        let mut poller: Poller<u32> = Poller::spawn(
            || async { Err(ApiError::Unauthorized) },
            |_| Duration::from_millis(1),
        );

        assert!(matches!(poller.next().await, Some(Err(ApiError::Unauthorized))));
        assert!(poller.next().await.is_none());
    }

    #[test]
    fn test_cadence_from_config() {
        let cadence = PollCadence::default();
        assert_eq!(cadence.delay(true), Duration::from_secs(3));
        assert_eq!(cadence.delay(false), Duration::from_secs(30));
    }
}
