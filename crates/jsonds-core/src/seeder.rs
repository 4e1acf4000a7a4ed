//! One-shot backfill of historical events.
//!
//! Seeding writes `count` events [`SEED_STEP_MINUTES`] minutes apart, ending
//! exactly at the supplied `now`. It must finish before the generator starts and
//! before the listener accepts traffic.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::store::EventStore;

/// Spacing between two seeded events, in minutes.
pub const SEED_STEP_MINUTES: i64 = 20;

/// Largest backlog the seeder will write, a little under four years of
/// history at [`SEED_STEP_MINUTES`].
pub const MAX_SEED_COUNT: usize = 100_000;

/// Spacing between two seeded events.
pub fn seed_step() -> Duration {
    Duration::minutes(SEED_STEP_MINUTES)
}

/// Timestamps for `count` events, oldest first, the newest equal to `now`.
///
/// `count` is clamped to [`MAX_SEED_COUNT`]. Timestamps that would fall
/// before chrono's earliest representable instant are skipped.
pub fn seed_timestamps(count: usize, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let count = count.min(MAX_SEED_COUNT);
    let step = seed_step();
    let mut timestamps = Vec::with_capacity(count);
    for back in (0..count).rev() {
        let Ok(back) = i32::try_from(back) else {
            continue;
        };
        let Some(offset) = step.checked_mul(back) else {
            continue;
        };
        if let Some(at) = now.checked_sub_signed(offset) {
            timestamps.push(at);
        }
    }
    timestamps
}

/// Append `count` backdated events to `store`, the newest at `now`.
///
/// Returns the number of events written.
pub async fn seed(store: &EventStore, count: usize, now: DateTime<Utc>) -> usize {
    let written = store.append_batch(seed_timestamps(count, now)).await;
    info!(count = written, step_minutes = SEED_STEP_MINUTES, "Event log seeded");
    written
}

/// [`seed`] anchored at the current wall-clock time.
pub async fn seed_now(store: &EventStore, count: usize) -> usize {
    seed(store, count, Utc::now()).await
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_wrap
)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().unwrap()
    }

    #[tokio::test]
    async fn seed_three_lands_on_twenty_minute_grid() {
        let store = EventStore::new();
        let now = fixed_now();

        assert_eq!(seed(&store, 3, now).await, 3);

        let events = store.snapshot().await;
        let expected: Vec<i64> = [40, 20, 0]
            .iter()
            .map(|m| (now - Duration::minutes(*m)).timestamp_millis())
            .collect();
        let actual: Vec<i64> = events.iter().map(|e| e.timestamp).collect();
        assert_eq!(actual, expected);
        assert_eq!(events[0].title, "event 0000");
        assert_eq!(events[2].sequence_index, 2);
    }

    #[tokio::test]
    async fn window_selects_the_two_older_seeds() {
        let store = EventStore::new();
        let now = fixed_now();
        seed(&store, 3, now).await;

        let from = (now - Duration::minutes(50)).timestamp_millis();
        let to = (now - Duration::minutes(10)).timestamp_millis();
        let hits = store.query_range(from, to).await;

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].timestamp, (now - Duration::minutes(40)).timestamp_millis());
        assert_eq!(hits[1].timestamp, (now - Duration::minutes(20)).timestamp_millis());
    }

    #[tokio::test]
    async fn seed_zero_writes_nothing() {
        let store = EventStore::new();
        assert_eq!(seed(&store, 0, fixed_now()).await, 0);
        assert!(store.is_empty().await);
    }

    #[test]
    fn seeded_timestamps_strictly_increase_and_end_at_now() {
        for count in [1_usize, 2, 7, 100, 500] {
            let now = fixed_now();
            let timestamps = seed_timestamps(count, now);

            assert_eq!(timestamps.len(), count);
            assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(timestamps.last().copied(), Some(now));
        }
    }

    #[test]
    fn oversized_count_is_clamped() {
        let now = fixed_now();
        let timestamps = seed_timestamps(usize::MAX, now);

        assert_eq!(timestamps.len(), MAX_SEED_COUNT);
        assert_eq!(timestamps.last().copied(), Some(now));
        assert_eq!(
            timestamps.first().copied(),
            Some(now - Duration::minutes(20 * (MAX_SEED_COUNT as i64 - 1)))
        );
    }

    #[tokio::test]
    async fn seed_writes_at_most_the_cap() {
        let store = EventStore::new();
        let written = seed(&store, MAX_SEED_COUNT + 10, fixed_now()).await;

        assert_eq!(written, MAX_SEED_COUNT);
        assert_eq!(store.len().await, MAX_SEED_COUNT);
    }

    #[tokio::test]
    async fn seed_now_is_not_in_the_future() {
        let store = EventStore::new();
        seed_now(&store, 5).await;
        let newest = store.snapshot().await.last().map(|e| e.timestamp).unwrap();
        assert!(newest <= Utc::now().timestamp_millis());
    }

    #[tokio::test]
    async fn seeding_continues_the_counter() {
        let store = EventStore::new();
        store.append(fixed_now()).await;
        seed(&store, 2, fixed_now()).await;

        let indices: Vec<u64> = store.snapshot().await.iter().map(|e| e.sequence_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
