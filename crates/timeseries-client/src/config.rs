use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Connection parameters for the explicit construction path.
///
/// Host, port, and token are each mandatory when no prebuilt connection is
/// supplied; [`validate`](Self::validate) fails before any network activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Store host name, without scheme
    pub host: Option<String>,
    /// Store port
    pub port: Option<u16>,
    /// Organization name
    pub organization: String,
    /// API token
    pub token: Option<String>,
}

impl ConnectionConfig {
    /// Start an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the organization
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }

    /// Set the API token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Check that every mandatory parameter is present
    pub fn validate(&self) -> Result<()> {
        if self.host.is_none() {
            return Err(Error::Config(
                "host is required when no prebuilt connection is given".to_string(),
            ));
        }
        if self.port.is_none() {
            return Err(Error::Config(
                "port is required when no prebuilt connection is given".to_string(),
            ));
        }
        if self.token.is_none() {
            return Err(Error::Config(
                "token is required when no prebuilt connection is given".to_string(),
            ));
        }
        Ok(())
    }

    /// Compose the store base URL as `https://<host>:<port>`
    pub(crate) fn url(&self) -> Result<String> {
        match (&self.host, &self.port) {
            (Some(host), Some(port)) => Ok(format!("https://{}:{}", host, port)),
            _ => Err(Error::Config(
                "host and port are required to compose the store URL".to_string(),
            )),
        }
    }
}
