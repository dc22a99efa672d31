use serde::Deserialize;

use super::connection::InfluxConnection;
use crate::frame::DataFrame;
use crate::types::FluxTable;
use crate::{Error, Result};

/// Query delegate for Flux reads
#[derive(Debug, Clone)]
pub struct QueryApi {
    conn: InfluxConnection,
}

/// Query result envelope from the store
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<FluxTable>,
}

impl QueryApi {
    pub(crate) fn new(conn: InfluxConnection) -> Self {
        Self { conn }
    }

    /// Execute a Flux query and return the raw result tables
    #[tracing::instrument(skip(self, flux_query), err)]
    pub async fn query(&self, flux_query: &str) -> Result<Vec<FluxTable>> {
        let response = self
            .conn
            .post("/api/v2/query")
            .header("Accept", "application/json")
            .header("Content-Type", "application/vnd.flux")
            .query(&[("org", self.conn.org())])
            .body(flux_query.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(Error::Api { status, message });
        }

        let decoded: QueryResponse = response.json().await?;
        Ok(decoded.results)
    }

    /// Execute a Flux query and materialize the result as a frame
    #[tracing::instrument(skip(self, flux_query), err)]
    pub async fn query_dataframe(&self, flux_query: &str) -> Result<DataFrame> {
        let tables = self.query(flux_query).await?;
        Ok(DataFrame::from_tables(&tables))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_query_invalid_url() {
        let api = QueryApi::new(InfluxConnection::new(
            "http://invalid-url-12345:8086",
            "test-org",
            None,
        ));

        let result = api.query("from(bucket: \"heating\")").await;
        assert!(matches!(result, Err(Error::Http(_))));
    }
}
