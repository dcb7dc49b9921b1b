//! Journey planner client error types.

/// Errors from a remote fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not valid JSON
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Response was JSON but the record list had the wrong shape
    #[error("unexpected response shape: {0}")]
    Shape(String),

    /// Client could not be built from its configuration
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl FetchError {
    /// Whether this failure happened at the network layer (connect, timeout,
    /// broken request) rather than in the service's answer.
    pub fn is_network(&self) -> bool {
        match self {
            FetchError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FetchError::Api {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "API error 503: Service Unavailable");

        let err = FetchError::Json {
            message: "expected value".into(),
            body: Some("<html>".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert!(err.to_string().contains("expected value"));

        let err = FetchError::Shape("journeys is not an array".into());
        assert_eq!(
            err.to_string(),
            "unexpected response shape: journeys is not an array"
        );
    }

    #[test]
    fn api_errors_are_not_network_errors() {
        let err = FetchError::Api {
            status: 500,
            message: String::new(),
        };
        assert!(!err.is_network());
        assert!(!FetchError::Shape("x".into()).is_network());
    }
}
