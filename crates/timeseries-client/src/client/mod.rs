//! The client facade and its delegates.

mod buckets;
mod connection;
mod query;
mod write;

pub use buckets::BucketsApi;
pub use connection::{HealthResponse, InfluxConnection};
pub use query::QueryApi;
pub use write::WriteApi;

use crate::config::ConnectionConfig;
use crate::frame::DataFrame;
use crate::query::QueryBuilder;
use crate::types::{FluxTable, Point};
use crate::{Error, Result};

/// Facade over one store connection and its three delegates: synchronous
/// writes, Flux queries, and bucket administration.
#[derive(Debug, Clone)]
pub struct TimeseriesClient {
    connection: InfluxConnection,
    write_api: WriteApi,
    query_api: QueryApi,
    buckets_api: BucketsApi,
}

impl TimeseriesClient {
    /// Build a client from explicit connection parameters. A missing host,
    /// port, or token fails before any network activity.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let url = config.url()?;
        Ok(Self::from_connection(InfluxConnection::new(
            url,
            config.organization,
            config.token,
        )))
    }

    /// Wrap an existing connection (the prebuilt-client path)
    pub fn from_connection(connection: InfluxConnection) -> Self {
        let write_api = WriteApi::new(connection.clone());
        let query_api = QueryApi::new(connection.clone());
        let buckets_api = BucketsApi::new(connection.clone());
        Self {
            connection,
            write_api,
            query_api,
            buckets_api,
        }
    }

    /// Build a client from the standard environment properties
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_connection(InfluxConnection::from_env()?))
    }

    /// The underlying connection handle
    pub fn connection(&self) -> &InfluxConnection {
        &self.connection
    }

    /// Probe the store's health endpoint
    pub async fn health(&self) -> Result<HealthResponse> {
        self.connection.health().await
    }

    /// Fail with [`Error::Unreachable`] unless the store reports a passing
    /// health status. This is the only connectivity gate; reads and writes
    /// perform no per-call probe.
    pub async fn connect(&self) -> Result<()> {
        let health = self
            .health()
            .await
            .map_err(|err| Error::Unreachable(err.to_string()))?;

        if !health.is_pass() {
            return Err(Error::Unreachable(format!(
                "health status is {:?}",
                health.status
            )));
        }

        Ok(())
    }

    /// Create a bucket, treating an already-existing bucket as success
    pub async fn create_bucket(&self, bucket: &str) -> Result<()> {
        self.buckets_api.create_bucket(bucket).await
    }

    /// Execute the built query and return the raw result tables
    pub async fn get_points(&self, query: &QueryBuilder) -> Result<Vec<FluxTable>> {
        self.query_api.query(&query.build()).await
    }

    /// Execute the built query and materialize the result as a frame
    pub async fn get_dataframe(&self, query: &QueryBuilder) -> Result<DataFrame> {
        self.query_api.query_dataframe(&query.build()).await
    }

    /// Forward a point collection to the named bucket
    pub async fn write_points(&self, project: &str, points: &[Point]) -> Result<()> {
        self.write_api.write_points(project, points).await
    }

    /// Write a frame, optionally broadcasting additional constant tags over
    /// every row
    pub async fn write_dataframe(
        &self,
        project: &str,
        measurement: &str,
        frame: &DataFrame,
        tag_columns: &[String],
        additional_tags: &[(String, String)],
    ) -> Result<()> {
        self.write_api
            .write_dataframe(project, measurement, frame, tag_columns, additional_tags)
            .await
    }
}
