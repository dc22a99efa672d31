/// Errors raised by the time-series client facade
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A required connection parameter was missing at construction time
    #[error("configuration error: {0}")]
    Config(String),

    /// The store's health probe failed or reported a non-pass status
    #[error("time-series store is not reachable: {0}")]
    Unreachable(String),

    /// A supplied timestamp is not a proper date-time or carries no offset
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The configured organization does not exist in the store
    #[error("organization not found: {0}")]
    OrgNotFound(String),

    /// Frame shape violation
    #[error("dataframe error: {0}")]
    Frame(String),

    /// A point or frame row cannot be encoded as line protocol
    #[error("line protocol error: {0}")]
    LineProtocol(String),

    /// Non-2xx store response, passed through unmodified
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP transport error (boxed so the enum stays small)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<reqwest::Error>),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("token is required".to_string());
        assert_eq!(err.to_string(), "configuration error: token is required");

        let err = Error::Api {
            status: 404,
            message: "bucket not found".to_string(),
        };
        assert_eq!(err.to_string(), "API error (status 404): bucket not found");
    }

    #[tokio::test]
    async fn test_error_from_reqwest() {
        let client = reqwest::Client::new();
        let result = client.get("http://invalid-url-12345:8086").send().await;

        assert!(result.is_err());
        let err: Error = result.unwrap_err().into();
        assert!(matches!(err, Error::Http(_)));
    }
}
