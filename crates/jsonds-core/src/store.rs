//! The in-memory annotation event log.
//!
//! [`EventStore`] is an append-only sequence of [`Event`]s guarded by a
//! single [`RwLock`]. Index assignment and append happen inside the same
//! write section, so a reader either sees a whole event or none of it.
//! Readers copy matching events out and release the lock before doing
//! anything else with them.
//!
//! The store is constructed explicitly and shared through an `Arc`; there
//! is no process-wide instance.

use chrono::{DateTime, Utc};
use jsonds_types::Event;
use tokio::sync::RwLock;

/// Contents of the log, only reachable through the lock.
#[derive(Debug, Default)]
struct EventLog {
    /// Events in insertion order.
    events: Vec<Event>,
    /// Index handed to the next appended event.
    next_index: u64,
}

impl EventLog {
    fn push(&mut self, at: DateTime<Utc>) -> Event {
        let event = Event::synthetic(self.next_index, at);
        self.next_index = self.next_index.saturating_add(1);
        self.events.push(event.clone());
        event
    }
}

/// Append-only event log shared by the seeder, generator and handlers.
#[derive(Debug, Default)]
pub struct EventStore {
    inner: RwLock<EventLog>,
}

impl EventStore {
    /// Create an empty store whose first event gets index 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one synthetic event stamped `at` and return a copy of it.
    pub async fn append(&self, at: DateTime<Utc>) -> Event {
        self.inner.write().await.push(at)
    }

    /// Append one event per timestamp under a single lock acquisition.
    ///
    /// Returns the number of events appended.
    pub async fn append_batch<I>(&self, timestamps: I) -> usize
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let mut log = self.inner.write().await;
        let mut appended: usize = 0;
        for at in timestamps {
            log.push(at);
            appended = appended.saturating_add(1);
        }
        appended
    }

    /// Every event with `from_ms < timestamp < to_ms`, in insertion order.
    ///
    /// Both bounds are exclusive. An inverted or empty window yields an
    /// empty vector.
    pub async fn query_range(&self, from_ms: i64, to_ms: i64) -> Vec<Event> {
        let log = self.inner.read().await;
        log.events
            .iter()
            .filter(|e| e.timestamp > from_ms && e.timestamp < to_ms)
            .cloned()
            .collect()
    }

    /// Number of events stored.
    pub async fn len(&self) -> usize {
        self.inner.read().await.events.len()
    }

    /// Whether no event has been stored yet.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.events.is_empty()
    }

    /// Index the next appended event will receive.
    pub async fn next_index(&self) -> u64 {
        self.inner.read().await.next_index
    }

    /// A copy of the whole log.
    pub async fn snapshot(&self) -> Vec<Event> {
        self.inner.read().await.events.clone()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone};

    use super::*;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).single().unwrap()
    }

    async fn store_at_minutes(minutes: &[i64]) -> EventStore {
        let store = EventStore::new();
        store
            .append_batch(minutes.iter().map(|m| base() + Duration::minutes(*m)))
            .await;
        store
    }

    fn ms(minutes: i64) -> i64 {
        (base() + Duration::minutes(minutes)).timestamp_millis()
    }

    #[tokio::test]
    async fn append_assigns_increasing_indices() {
        let store = EventStore::new();
        let first = store.append(base()).await;
        let second = store.append(base()).await;

        assert_eq!(first.sequence_index, 0);
        assert_eq!(second.sequence_index, 1);
        assert_eq!(store.next_index().await, 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn new_store_is_empty() {
        let store = EventStore::new();
        assert!(store.is_empty().await);
        assert!(store.query_range(i64::MIN, i64::MAX).await.is_empty());
    }

    #[tokio::test]
    async fn range_is_exclusive_on_both_ends() {
        let store = store_at_minutes(&[0, 10, 20, 30]).await;

        let hits = store.query_range(ms(0), ms(30)).await;
        let minutes: Vec<i64> = hits.iter().map(|e| e.timestamp).collect();

        assert_eq!(minutes, vec![ms(10), ms(20)]);
    }

    #[tokio::test]
    async fn range_preserves_insertion_order() {
        let store = store_at_minutes(&[5, 1, 3]).await;

        let hits = store.query_range(ms(0), ms(10)).await;
        let indices: Vec<u64> = hits.iter().map(|e| e.sequence_index).collect();

        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn inverted_window_matches_nothing() {
        let store = store_at_minutes(&[0, 10, 20]).await;
        assert!(store.query_range(ms(20), ms(0)).await.is_empty());
        assert!(store.query_range(ms(10), ms(10)).await.is_empty());
    }

    #[tokio::test]
    async fn query_does_not_mutate() {
        let store = store_at_minutes(&[0, 10]).await;
        let _ = store.query_range(ms(-1), ms(11)).await;
        assert_eq!(store.len().await, 2);
        assert_eq!(store.next_index().await, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_and_reads_see_whole_events() {
        let store = Arc::new(EventStore::new());
        let mut writers = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&store);
            writers.push(tokio::spawn(async move {
                for _ in 0..250 {
                    store.append(Utc::now()).await;
                }
            }));
        }

        let reader = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                for _ in 0..100 {
                    for event in store.query_range(i64::MIN, i64::MAX).await {
                        let expected = Event::synthetic(
                            event.sequence_index,
                            DateTime::from_timestamp_millis(event.timestamp).unwrap(),
                        );
                        assert_eq!(event, expected);
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        for writer in writers {
            writer.await.unwrap();
        }
        reader.await.unwrap();

        let all = store.snapshot().await;
        assert_eq!(all.len(), 1000);
        let mut indices: Vec<u64> = all.iter().map(|e| e.sequence_index).collect();
        indices.dedup();
        assert_eq!(indices.len(), 1000);
        assert_eq!(store.next_index().await, 1000);
    }
}
