//! Annotation query shapes.
//!
//! The front-end sends an [`AnnotationsReq`] describing which annotation
//! it wants drawn and over which time range. The server answers with one
//! [`AnnotationResponse`] per event in the range, each carrying the
//! caller's [`Annotation`] back so the front-end can match them up.
//!
//! See the simple-JSON datasource annotation API for the field meanings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::event::Event;

/// The raw, unparsed range expressions typed by the user (e.g. `now-6h`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct RangeRaw {
    /// Start expression.
    pub from: String,
    /// End expression.
    pub to: String,
}

/// The absolute time range a request applies to.
///
/// `from` and `to` arrive as RFC 3339 strings. A missing bound decodes to
/// the UNIX epoch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct Range {
    /// Start of the range.
    pub from: DateTime<Utc>,
    /// End of the range.
    pub to: DateTime<Utc>,
    /// The expressions the range was resolved from.
    pub raw: RangeRaw,
}

impl Range {
    /// Start of the range in epoch milliseconds.
    pub fn start_millis(&self) -> i64 {
        self.from.timestamp_millis()
    }

    /// End of the range in epoch milliseconds.
    pub fn end_millis(&self) -> i64 {
        self.to.timestamp_millis()
    }
}

/// The annotation definition the front-end is asking for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Annotation {
    /// Must match between request and response.
    pub name: String,
    /// Name of the datasource the annotation belongs to.
    pub datasource: String,
    /// Marker colour.
    pub icon_color: String,
    /// Whether the annotation is switched on in the dashboard.
    pub enable: bool,
    /// Whether a vertical line is drawn at the event time.
    pub show_line: bool,
    /// Free-form query text.
    pub query: String,
}

/// Body of a `POST /annotations` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct AnnotationsReq {
    /// Window to collect events from.
    pub range: Range,
    /// Annotation to stamp onto every returned event.
    pub annotation: Annotation,
}

/// One annotation event as rendered by the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AnnotationResponse {
    /// The annotation sent in the request, with `show_line` forced on.
    pub annotation: Annotation,
    /// Time of the event in epoch milliseconds.
    #[ts(type = "number")]
    pub time: i64,
    /// Tooltip title.
    pub title: String,
    /// Space-separated tags.
    pub tags: String,
    /// Tooltip body.
    pub text: String,
}

impl AnnotationResponse {
    /// Attach `annotation` to `event`.
    ///
    /// The echoed annotation always has `show_line` set, whatever the
    /// caller sent.
    pub fn decorate(annotation: &Annotation, event: &Event) -> Self {
        Self {
            annotation: Annotation {
                show_line: true,
                ..annotation.clone()
            },
            time: event.timestamp,
            title: event.title.clone(),
            tags: event.tags.clone(),
            text: event.text.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const REQUEST: &str = r##"{
        "range": {
            "from": "2016-04-15T13:44:39.070Z",
            "to": "2016-04-15T14:44:39.070Z",
            "raw": { "from": "now-1h", "to": "now" }
        },
        "annotation": {
            "name": "deploy",
            "datasource": "jsonds",
            "iconColor": "rgba(255, 96, 96, 1)",
            "enable": true,
            "showLine": false,
            "query": "#deploy"
        }
    }"##;

    #[test]
    fn parse_full_request() {
        let req: AnnotationsReq = serde_json::from_str(REQUEST).unwrap();

        assert_eq!(req.annotation.name, "deploy");
        assert_eq!(req.annotation.icon_color, "rgba(255, 96, 96, 1)");
        assert!(!req.annotation.show_line);
        assert_eq!(req.range.raw.from, "now-1h");
        assert_eq!(req.range.start_millis(), 1_460_727_879_070);
        assert_eq!(
            req.range.end_millis().saturating_sub(req.range.start_millis()),
            3_600_000
        );
    }

    #[test]
    fn missing_fields_take_defaults() {
        let req: AnnotationsReq = serde_json::from_str("{}").unwrap();
        assert_eq!(req.range.start_millis(), 0);
        assert_eq!(req.range.end_millis(), 0);
        assert!(req.annotation.name.is_empty());
    }

    #[test]
    fn non_rfc3339_range_is_rejected() {
        let result: Result<AnnotationsReq, _> =
            serde_json::from_str(r#"{"range":{"from":"yesterday","to":"now"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn decorate_forces_show_line() {
        let annotation = Annotation {
            name: String::from("deploy"),
            show_line: false,
            ..Annotation::default()
        };
        let event = Event::synthetic(3, DateTime::<Utc>::default());

        let decorated = AnnotationResponse::decorate(&annotation, &event);

        assert!(decorated.annotation.show_line);
        assert_eq!(decorated.annotation.name, "deploy");
        assert_eq!(decorated.title, "event 0003");
        assert_eq!(decorated.time, 0);
    }

    #[test]
    fn response_uses_wire_field_names() {
        let event = Event::synthetic(1, DateTime::<Utc>::default());
        let decorated = AnnotationResponse::decorate(&Annotation::default(), &event);
        let json = serde_json::to_value(&decorated).unwrap();

        assert_eq!(json["annotation"]["showLine"], true);
        assert!(json["annotation"].get("iconColor").is_some());
        assert_eq!(json["tags"], "atag btag ctag");
        assert_eq!(json["time"], 0);
    }
}
