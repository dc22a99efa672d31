use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const ENV_URL: &str = "INFLUXDB_V2_URL";
const ENV_ORG: &str = "INFLUXDB_V2_ORG";
const ENV_TOKEN: &str = "INFLUXDB_V2_TOKEN";

/// Shared HTTP core behind the facade and its delegates: base URL,
/// organization, optional token, and one reusable [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct InfluxConnection {
    url: String,
    org: String,
    token: Option<String>,
    http: Client,
}

impl InfluxConnection {
    /// Create a connection against the given base URL
    pub fn new(url: impl Into<String>, org: impl Into<String>, token: Option<String>) -> Self {
        let url = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            org: org.into(),
            token,
            http: Client::new(),
        }
    }

    /// Build a connection from the standard client environment properties
    /// (`INFLUXDB_V2_URL`, `INFLUXDB_V2_ORG`, `INFLUXDB_V2_TOKEN`)
    pub fn from_env() -> Result<Self> {
        let url = std::env::var(ENV_URL)
            .map_err(|_| Error::Config(format!("{ENV_URL} is not set")))?;
        let org = std::env::var(ENV_ORG)
            .map_err(|_| Error::Config(format!("{ENV_ORG} is not set")))?;
        let token = std::env::var(ENV_TOKEN).ok();
        Ok(Self::new(url, org, token))
    }

    /// The store base URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The organization name sent with queries and writes
    pub fn org(&self) -> &str {
        &self.org
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.get(format!("{}{}", self.url, path)))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.post(format!("{}{}", self.url, path)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Token {}", token)),
            None => request,
        }
    }

    /// Probe the store's health endpoint
    #[tracing::instrument(skip(self), err)]
    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self.get("/health").send().await?;

        if !response.status().is_success() {
            return Err(Error::Api {
                status: response.status().as_u16(),
                message: format!("health check failed with status {}", response.status()),
            });
        }

        Ok(response.json().await?)
    }
}

/// Health probe response from the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status ("pass" or "fail")
    pub status: String,
    /// Store version
    #[serde(default)]
    pub version: String,
    /// Additional message
    #[serde(default)]
    pub message: String,
}

impl HealthResponse {
    /// True when the store reports a passing status
    pub fn is_pass(&self) -> bool {
        self.status == "pass"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_trims_trailing_slash() {
        let conn = InfluxConnection::new("https://influx.example.org:8086/", "test-org", None);
        assert_eq!(conn.url(), "https://influx.example.org:8086");
        assert_eq!(conn.org(), "test-org");
    }

    #[test]
    fn test_health_response_status() {
        let pass = HealthResponse {
            status: "pass".to_string(),
            version: String::new(),
            message: String::new(),
        };
        assert!(pass.is_pass());

        let fail = HealthResponse {
            status: "fail".to_string(),
            version: String::new(),
            message: String::new(),
        };
        assert!(!fail.is_pass());
    }

    // Single test so the environment mutations cannot race each other
    #[test]
    fn test_from_env_round_trip() {
        std::env::remove_var(ENV_URL);
        std::env::remove_var(ENV_ORG);
        std::env::remove_var(ENV_TOKEN);

        let result = InfluxConnection::from_env();
        assert!(matches!(result, Err(Error::Config(_))));

        std::env::set_var(ENV_URL, "https://influx.example.org:8086");
        std::env::set_var(ENV_ORG, "test-org");
        std::env::set_var(ENV_TOKEN, "test-token");

        let conn = InfluxConnection::from_env().unwrap();
        assert_eq!(conn.url(), "https://influx.example.org:8086");
        assert_eq!(conn.org(), "test-org");

        std::env::remove_var(ENV_URL);
        std::env::remove_var(ENV_ORG);
        std::env::remove_var(ENV_TOKEN);
    }

    #[tokio::test]
    async fn test_health_invalid_url() {
        let conn = InfluxConnection::new("http://invalid-url-12345:8086", "test-org", None);
        let result = conn.health().await;
        assert!(result.is_err());
    }
}
