//! Periodic background appender.
//!
//! The [`Generator`] appends one synthetic event stamped with the current
//! wall-clock time every period, for as long as the process runs. It stops
//! when the process-wide [`CancellationToken`] fires and never fails.
//!
//! The first event is appended one full period after the task starts, not
//! immediately.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::store::EventStore;

/// Shortest period the generator will run with.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Background task that grows the event log on a fixed period.
#[derive(Debug, Clone)]
pub struct Generator {
    store: Arc<EventStore>,
    period: Duration,
}

impl Generator {
    /// Create a generator appending to `store` every `period`.
    ///
    /// Periods shorter than one millisecond are raised to one millisecond.
    pub fn new(store: Arc<EventStore>, period: Duration) -> Self {
        Self {
            store,
            period: period.max(MIN_PERIOD),
        }
    }

    /// The effective period between two appends.
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Spawn the generator as a Tokio task.
    ///
    /// The task resolves to the number of events it appended once `cancel`
    /// fires.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<u64> {
        tokio::spawn(self.run(cancel))
    }

    /// Run the append loop until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) -> u64 {
        let start = Instant::now()
            .checked_add(self.period)
            .unwrap_or_else(Instant::now);
        let mut ticker = interval_at(start, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(period_ms = self.period.as_millis(), "Event generator started");

        let mut appended: u64 = 0;
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!(appended, "Event generator stopped");
                    return appended;
                }
                _ = ticker.tick() => {
                    let event = self.store.append(Utc::now()).await;
                    appended = appended.saturating_add(1);
                    debug!(
                        index = event.sequence_index,
                        timestamp = event.timestamp,
                        "Generated event"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn appends_one_event_per_period() {
        let store = Arc::new(EventStore::new());
        let cancel = CancellationToken::new();
        let handle =
            Generator::new(Arc::clone(&store), Duration::from_secs(10)).spawn(cancel.clone());

        tokio::time::sleep(Duration::from_secs(35)).await;
        cancel.cancel();

        assert_eq!(handle.await.unwrap(), 3);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn first_event_waits_a_full_period() {
        let store = Arc::new(EventStore::new());
        let cancel = CancellationToken::new();
        let handle =
            Generator::new(Arc::clone(&store), Duration::from_secs(10)).spawn(cancel.clone());

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert!(store.is_empty().await);

        cancel.cancel();
        assert_eq!(handle.await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn continues_the_store_counter() {
        let store = Arc::new(EventStore::new());
        crate::seeder::seed_now(&store, 4).await;

        let cancel = CancellationToken::new();
        let handle =
            Generator::new(Arc::clone(&store), Duration::from_secs(1)).spawn(cancel.clone());
        tokio::time::sleep(Duration::from_millis(2500)).await;
        cancel.cancel();
        handle.await.unwrap();

        let events = store.snapshot().await;
        assert_eq!(events.len(), 6);
        assert_eq!(events.last().map(|e| e.title.as_str()), Some("event 0005"));
    }

    #[tokio::test]
    async fn cancelled_before_start_appends_nothing() {
        let store = Arc::new(EventStore::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let appended = Generator::new(Arc::clone(&store), Duration::from_millis(1))
            .run(cancel)
            .await;

        assert_eq!(appended, 0);
        assert!(store.is_empty().await);
    }

    #[test]
    fn zero_period_is_raised() {
        let generator = Generator::new(Arc::new(EventStore::new()), Duration::ZERO);
        assert_eq!(generator.period(), MIN_PERIOD);
    }
}
