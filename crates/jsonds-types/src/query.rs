//! Time-series query shapes and the fixture series served for every query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use ts_rs::TS;

use crate::annotation::{Range, RangeRaw};

/// Name of the single series returned by the query fixture.
pub const FIXTURE_SERIES: &str = "abc";

/// One target row from the query editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Target {
    /// Series name.
    pub target: String,
    /// Panel-local reference (`A`, `B`, ...).
    pub ref_id: String,
    /// Requested shape: `timeserie` or `table`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Body of a `POST /query` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct QueryReq {
    /// Panel issuing the query.
    #[ts(type = "number")]
    pub panel_id: i64,
    /// Front-end request identifier.
    pub request_id: String,
    /// Absolute query range.
    pub range: Range,
    /// Unresolved range expressions.
    pub range_raw: RangeRaw,
    /// Suggested bucket width (e.g. `30s`).
    pub interval: String,
    /// Suggested bucket width in milliseconds.
    #[ts(type = "number")]
    pub interval_ms: i64,
    /// Series requested.
    pub targets: Vec<Target>,
    /// Response format (`json`).
    pub format: String,
    /// Point budget for the panel.
    #[ts(type = "number")]
    pub max_data_points: i64,
}

/// A `[value, timestamp_ms]` pair.
///
/// The value is a JSON number as written, so whole values go out without a
/// trailing `.0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Datapoint(#[ts(type = "number")] pub Number, #[ts(type = "number")] pub i64);

/// One named series in a query response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TimeSeries {
    /// Series name.
    pub target: String,
    /// Points in time order.
    pub datapoints: Vec<Datapoint>,
}

impl TimeSeries {
    /// The fixture answered for every query, anchored at `now`.
    ///
    /// Two points: 622 at `now` and 365 a thousand seconds later. `now` is
    /// truncated to whole seconds before conversion to milliseconds.
    pub fn fixture(now: DateTime<Utc>) -> Self {
        let ts = now.timestamp().saturating_mul(1000);
        Self {
            target: String::from(FIXTURE_SERIES),
            datapoints: vec![
                Datapoint(Number::from(622), ts),
                Datapoint(Number::from(365), ts.saturating_add(1_000_000)),
            ],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn parse_query_request() {
        let body = r#"{
            "panelId": 1,
            "requestId": "Q100",
            "range": {
                "from": "2016-10-31T06:33:44.866Z",
                "to": "2016-10-31T12:33:44.866Z",
                "raw": { "from": "now-6h", "to": "now" }
            },
            "rangeRaw": { "from": "now-6h", "to": "now" },
            "interval": "30s",
            "intervalMs": 30000,
            "targets": [
                { "target": "upper_50", "refId": "A", "type": "timeserie" },
                { "target": "upper_75", "refId": "B", "type": "timeserie" }
            ],
            "format": "json",
            "maxDataPoints": 550
        }"#;

        let req: QueryReq = serde_json::from_str(body).unwrap();

        assert_eq!(req.panel_id, 1);
        assert_eq!(req.interval_ms, 30_000);
        assert_eq!(req.max_data_points, 550);
        assert_eq!(req.targets.len(), 2);
        assert_eq!(req.targets[1].ref_id, "B");
        assert_eq!(req.targets[0].kind, "timeserie");
        assert_eq!(req.range_raw.from, "now-6h");
    }

    #[test]
    fn fixture_is_anchored_at_whole_seconds() {
        let now = Utc
            .timestamp_millis_opt(1_700_000_000_789)
            .single()
            .unwrap();
        let series = TimeSeries::fixture(now);

        assert_eq!(series.target, "abc");
        assert_eq!(series.datapoints.len(), 2);
        assert_eq!(series.datapoints[0].0, Number::from(622));
        assert_eq!(series.datapoints[0].1, 1_700_000_000_000);
        assert_eq!(series.datapoints[1].1, 1_700_001_000_000);
    }

    #[test]
    fn datapoint_serializes_as_pair() {
        let json = serde_json::to_value(Datapoint(Number::from(365), 42)).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0], 365);
        assert_eq!(json[1], 42);
    }

    #[test]
    fn fixture_values_encode_as_integers() {
        let series = TimeSeries::fixture(DateTime::<Utc>::default());
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(
            json,
            r#"{"target":"abc","datapoints":[[622,0],[365,1000000]]}"#
        );
    }

    #[test]
    fn fractional_values_survive_decode() {
        let point: Datapoint = serde_json::from_str("[0.5, 7]").unwrap();
        assert!(point.0.is_f64());
        assert!((point.0.as_f64().unwrap() - 0.5).abs() < f64::EPSILON);
        assert_eq!(point.1, 7);
    }
}
