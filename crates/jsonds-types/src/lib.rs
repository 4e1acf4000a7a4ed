//! Wire shapes for the jsonds datasource protocol.
//!
//! Every request and response body exchanged with the dashboard front-end
//! is defined here, together with the [`Event`] record kept by the event
//! log. Types flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`annotation`] -- annotation queries and decorated annotation events
//! - [`event`] -- the synthetic event record stored in the event log
//! - [`query`] -- time-series query request and the fixture response
//! - [`search`] -- metric search request and the fixed target list

pub mod annotation;
pub mod event;
pub mod query;
pub mod search;

// Re-export all public types at crate root for convenience.
pub use annotation::{Annotation, AnnotationResponse, AnnotationsReq, Range, RangeRaw};
pub use event::Event;
pub use query::{Datapoint, QueryReq, Target, TimeSeries};
pub use search::{SEARCH_TARGETS, SearchReq};

#[cfg(test)]
mod tests {
    //! Binding generation for the wire shapes.

    #[test]
    fn export_bindings() {
        // Writes the `.ts` files under `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::annotation::AnnotationsReq::export_all();
        let _ = crate::annotation::AnnotationResponse::export_all();
        let _ = crate::query::QueryReq::export_all();
        let _ = crate::query::TimeSeries::export_all();
        let _ = crate::search::SearchReq::export_all();
        let _ = crate::event::Event::export_all();
    }
}
