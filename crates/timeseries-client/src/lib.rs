//! Client facade for an InfluxDB 2.x time-series store.
//!
//! Wraps connection handling, bucket provisioning, Flux query assembly, and
//! point/frame writes behind one small client type. Reads come back as raw
//! Flux tables or materialized as a row-indexed [`DataFrame`]; writes accept
//! [`Point`] collections or frames annotated with tag columns.

pub mod client;
pub mod config;
pub mod error;
pub mod frame;
pub mod query;
pub mod types;

// Re-exports
pub use client::{HealthResponse, InfluxConnection, TimeseriesClient};
pub use config::ConnectionConfig;
pub use error::Error;
pub use frame::{Column, DataFrame};
pub use query::QueryBuilder;
pub use types::{FieldValue, FluxRecord, FluxTable, Point, Timestamp};

/// Result type for client operations
pub type Result<T> = std::result::Result<T, Error>;
