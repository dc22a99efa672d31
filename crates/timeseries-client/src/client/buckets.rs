use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::connection::InfluxConnection;
use crate::{Error, Result};

/// Bucket administration delegate
#[derive(Debug, Clone)]
pub struct BucketsApi {
    conn: InfluxConnection,
}

#[derive(Debug, Deserialize)]
struct OrgList {
    #[serde(default)]
    orgs: Vec<Org>,
}

#[derive(Debug, Deserialize)]
struct Org {
    id: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct CreateBucketBody<'a> {
    #[serde(rename = "orgID")]
    org_id: &'a str,
    name: &'a str,
}

impl BucketsApi {
    pub(crate) fn new(conn: InfluxConnection) -> Self {
        Self { conn }
    }

    /// Create a bucket in the configured organization. A 422 conflict means
    /// the bucket already exists and is not treated as an error; every other
    /// failure propagates unchanged.
    #[tracing::instrument(skip(self), err)]
    pub async fn create_bucket(&self, bucket: &str) -> Result<()> {
        let org_id = self.resolve_org_id().await?;

        let response = self
            .conn
            .post("/api/v2/buckets")
            .json(&CreateBucketBody {
                org_id: &org_id,
                name: bucket,
            })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            // Bucket already exists
            return Ok(());
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(bucket, "bucket created");
        Ok(())
    }

    /// The bucket API takes an organization ID, so the configured name has to
    /// be resolved first
    async fn resolve_org_id(&self) -> Result<String> {
        let response = self
            .conn
            .get("/api/v2/orgs")
            .query(&[("org", self.conn.org())])
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

        let decoded: OrgList = response.json().await?;
        decoded
            .orgs
            .into_iter()
            .find(|org| org.name == self.conn.org())
            .map(|org| org.id)
            .ok_or_else(|| Error::OrgNotFound(self.conn.org().to_string()))
    }
}
