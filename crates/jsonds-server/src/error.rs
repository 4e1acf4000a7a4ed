//! Error types for the `jsonds` binary.
//!
//! [`ServerBinError`] is the top-level error type that wraps every failure
//! mode during startup and shutdown.

/// Top-level error for the `jsonds` binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum ServerBinError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: jsonds_core::ConfigError,
    },

    /// The datasource server could not start.
    #[error("startup error: {source}")]
    Startup {
        /// The underlying startup error.
        #[from]
        source: jsonds_api::StartupError,
    },

    /// The datasource server stopped with an error.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: jsonds_api::ServerError,
    },

    /// A background task panicked or was aborted.
    #[error("task error: {message}")]
    Task {
        /// Description of the task failure.
        message: String,
    },
}
