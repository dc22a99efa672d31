use super::connection::InfluxConnection;
use crate::frame::DataFrame;
use crate::types::Point;
use crate::{Error, Result};

/// Write delegate. Each call is one immediate dispatch to the write
/// endpoint; nothing is buffered or batched in this layer.
#[derive(Debug, Clone)]
pub struct WriteApi {
    conn: InfluxConnection,
}

impl WriteApi {
    pub(crate) fn new(conn: InfluxConnection) -> Self {
        Self { conn }
    }

    /// Write a point collection into the named bucket
    #[tracing::instrument(skip(self, points), fields(point_count = points.len()), err)]
    pub async fn write_points(&self, bucket: &str, points: &[Point]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let lines = points
            .iter()
            .map(Point::to_line_protocol)
            .collect::<Result<Vec<_>>>()?
            .join("\n");

        self.dispatch(bucket, lines).await
    }

    /// Write a frame into the named bucket. Columns listed in `tag_columns`
    /// become tags; `additional_tags` are broadcast over every row as extra
    /// constant tag columns. The caller's tag-column slice is never mutated.
    #[tracing::instrument(
        skip(self, frame, tag_columns, additional_tags),
        fields(row_count = frame.num_rows()),
        err
    )]
    pub async fn write_dataframe(
        &self,
        bucket: &str,
        measurement: &str,
        frame: &DataFrame,
        tag_columns: &[String],
        additional_tags: &[(String, String)],
    ) -> Result<()> {
        if frame.is_empty() {
            return Ok(());
        }

        let body = if additional_tags.is_empty() {
            frame.to_line_protocol(measurement, tag_columns)?
        } else {
            let (enriched, combined) = frame.with_additional_tags(tag_columns, additional_tags)?;
            enriched.to_line_protocol(measurement, &combined)?
        };

        self.dispatch(bucket, body).await
    }

    async fn dispatch(&self, bucket: &str, body: String) -> Result<()> {
        let response = self
            .conn
            .post("/api/v2/write")
            .header("Content-Type", "text/plain; charset=utf-8")
            .query(&[("org", self.conn.org()), ("bucket", bucket)])
            .body(body)
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

        tracing::debug!(bucket, "write accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn unreachable_api() -> WriteApi {
        WriteApi::new(InfluxConnection::new(
            "http://invalid-url-12345:8086",
            "test-org",
            None,
        ))
    }

    #[tokio::test]
    async fn test_write_points_empty_is_a_no_op() {
        // No request is made, so even an unreachable store succeeds
        let api = unreachable_api();
        assert!(api.write_points("heating", &[]).await.is_ok());
    }

    #[tokio::test]
    async fn test_write_points_invalid_url() {
        let api = unreachable_api();
        let timestamp = DateTime::parse_from_rfc3339("2025-01-15T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let points = vec![Point::new("room_climate")
            .field("value", 20.5)
            .timestamp(timestamp)];

        let result = api.write_points("heating", &points).await;
        assert!(matches!(result, Err(Error::Http(_))));
    }

    #[tokio::test]
    async fn test_write_dataframe_empty_is_a_no_op() {
        let api = unreachable_api();
        let frame = DataFrame::new(Vec::new());
        let result = api
            .write_dataframe("heating", "room_climate", &frame, &[], &[])
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_write_dataframe_rejects_bad_shape_before_dispatch() {
        use crate::types::FieldValue;

        let api = unreachable_api();
        let frame = DataFrame::new(vec![Utc::now()])
            .with_column("device", vec![FieldValue::Text("a".to_string())])
            .unwrap();

        // Only tag columns, no fields: encoding fails before any request
        let result = api
            .write_dataframe(
                "heating",
                "room_climate",
                &frame,
                &["device".to_string()],
                &[],
            )
            .await;
        assert!(matches!(result, Err(Error::LineProtocol(_))));
    }
}
