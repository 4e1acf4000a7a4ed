//! The synthetic event record kept by the in-memory event log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Tags attached to every synthetic event.
pub const EVENT_TAGS: &str = "atag btag ctag";

/// One synthetic occurrence in the event log.
///
/// Events are immutable once created. The sequence index is assigned by
/// the store at append time and is unique for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Position in the log's labelling sequence.
    #[ts(type = "number")]
    pub sequence_index: u64,
    /// Time of the event in milliseconds since the UNIX epoch.
    #[ts(type = "number")]
    pub timestamp: i64,
    /// Short title shown in the annotation tooltip.
    pub title: String,
    /// Longer description of the event.
    pub text: String,
    /// Space-separated tags.
    pub tags: String,
}

impl Event {
    /// Build the standard synthetic event for `index` occurring at `at`.
    pub fn synthetic(index: u64, at: DateTime<Utc>) -> Self {
        Self {
            sequence_index: index,
            timestamp: at.timestamp_millis(),
            title: format!("event {index:04}"),
            text: format!("text about the event {index:04}"),
            tags: String::from(EVENT_TAGS),
        }
    }
}
