//! Core of the jsonds datasource: the in-memory annotation event log.
//!
//! The log starts with a backlog of synthetic historical events written by
//! the [`seeder`] and then grows by one event per period for as long as the
//! [`generator`] task runs. Request handlers read it through
//! [`EventStore::query_range`].
//!
//! # Modules
//!
//! - [`config`] -- typed YAML configuration with defaults and env overrides
//! - [`store`] -- the lock-guarded, append-only event log
//! - [`seeder`] -- one-shot backfill of historical events
//! - [`generator`] -- periodic background appender

pub mod config;
pub mod generator;
pub mod seeder;
pub mod store;

pub use config::{ConfigError, JsondsConfig};
pub use generator::Generator;
pub use store::EventStore;
