//! Metric search request and the fixed list of queryable targets.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Target names returned by every search, also pushed over the echo socket.
pub const SEARCH_TARGETS: [&str; 7] = [
    "hello", "apple", "python", "golang", "base", "peach", "pear",
];

/// Body of a `POST /search` request.
///
/// Only parsed for validity; the target text does not filter the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct SearchReq {
    /// Free-text target typed into the query editor.
    pub target: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_parses() {
        let req: Result<SearchReq, _> = serde_json::from_str("{}");
        assert!(req.is_ok());
        assert_eq!(req.unwrap_or_default().target, "");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let req: Result<SearchReq, _> =
            serde_json::from_str(r#"{"target":"up","type":"timeserie"}"#);
        assert_eq!(req.unwrap_or_default().target, "up");
    }

    #[test]
    fn target_list_encodes_as_string_array() {
        let json = serde_json::to_string(&SEARCH_TARGETS).unwrap_or_default();
        assert_eq!(
            json,
            r#"["hello","apple","python","golang","base","peach","pear"]"#
        );
    }
}
