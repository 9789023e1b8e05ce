//! NetBox client errors

use thiserror::Error;

/// Errors that can occur when interacting with the NetBox API
#[derive(Debug, Error)]
pub enum NetBoxError {
    /// HTTP request/response error (connection refused, timeout, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// NetBox API returned a non-success status
    #[error("NetBox API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by NetBox
        status: u16,
        /// Response body or summary
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (invalid token, expired, etc.)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (e.g., malformed base URL or filter)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl NetBoxError {
    /// HTTP status attached to this error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Api { status, .. } => Some(*status),
            Self::Authentication(_) => Some(401),
            Self::NotFound(_) => Some(404),
            Self::Serialization(_) | Self::InvalidRequest(_) => None,
        }
    }

    /// True when NetBox reported the addressed object as absent
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Build an error from a non-success status and response body
    pub(crate) fn from_status(status: u16, context: &str, body: String) -> Self {
        match status {
            404 => Self::NotFound(format!("{} - {}", context, body)),
            401 | 403 => Self::Authentication(format!("{}: {} - {}", context, status, body)),
            _ => Self::Api {
                status,
                message: format!("{} failed - {}", context, body),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = NetBoxError::from_status(404, "GET /api/dcim/regions/4/", String::new());
        assert!(err.is_not_found());

        let err = NetBoxError::from_status(403, "GET /api/status/", "denied".to_string());
        assert!(matches!(err, NetBoxError::Authentication(_)));
        assert!(!err.is_not_found());

        let err = NetBoxError::from_status(500, "POST /api/extras/tags/", "boom".to_string());
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_api_404_is_not_found() {
        // Some callers construct Api errors directly (e.g. mocks injecting failures)
        let err = NetBoxError::Api { status: 404, message: "gone".to_string() };
        assert!(err.is_not_found());
    }
}
