//! Error types shared by the clients, the exporter and the HTTP surface.

use axum::{
    Json,
    http::{StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Everything that can go wrong while talking to Spotify, YouTube or the
/// OAuth token endpoints.
#[derive(Error, Debug)]
pub enum Error {
    /// No usable credential for a service.
    #[error("Unauthorized - {0}")]
    Unauthenticated(String),

    /// The access token expired and there is nothing to refresh it with.
    #[error("NoRefreshToken")]
    NoRefreshToken,

    /// The token endpoint rejected the refresh grant.
    #[error("RefreshAccessTokenError ({status}): {body}")]
    RefreshFailed { status: u16, body: String },

    /// The token endpoint rejected the authorization code.
    #[error("Token exchange failed ({status}): {body}")]
    TokenExchangeFailed { status: u16, body: String },

    #[error("{0}")]
    InvalidInput(String),

    #[error("Rate limited. Retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Upstream answered with a non-success status.
    #[error("API error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for the errors that mean "sign in again".
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Error::Unauthenticated(_) | Error::NoRefreshToken | Error::RefreshFailed { .. }
        )
    }

    /// HTTP status this error maps to when surfaced by the API server.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Unauthenticated(_) | Error::NoRefreshToken | Error::RefreshFailed { .. } => 401,
            Error::InvalidInput(_) => 400,
            Error::RateLimited { .. } => 429,
            Error::Upstream { status, .. } => *status,
            Error::TokenExchangeFailed { .. } => 502,
            _ => 500,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if let Error::RateLimited { retry_after_secs } = self {
            return (
                status,
                [(RETRY_AFTER, retry_after_secs.to_string())],
                Json(json!({ "error": "Rate limited", "retryAfter": retry_after_secs })),
            )
                .into_response();
        }

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Unauthenticated("x".into()).status_code(), 401);
        assert_eq!(Error::NoRefreshToken.status_code(), 401);
        assert_eq!(Error::InvalidInput("x".into()).status_code(), 400);
        assert_eq!(
            Error::RateLimited {
                retry_after_secs: 5
            }
            .status_code(),
            429
        );
        assert_eq!(
            Error::Upstream {
                status: 403,
                body: "quota".into()
            }
            .status_code(),
            403
        );
        assert_eq!(Error::Configuration("x".into()).status_code(), 500);
    }

    #[test]
    fn test_is_auth() {
        assert!(Error::NoRefreshToken.is_auth());
        assert!(
            Error::RefreshFailed {
                status: 400,
                body: String::new()
            }
            .is_auth()
        );
        assert!(!Error::InvalidInput("bad".into()).is_auth());
    }

    #[test]
    fn test_rate_limited_response() {
        let response = Error::RateLimited {
            retry_after_secs: 12,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[RETRY_AFTER], "12");
    }

    #[test]
    fn test_upstream_status_is_kept() {
        let response = Error::Upstream {
            status: 404,
            body: "missing".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_upstream_message() {
        let err = Error::Upstream {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(err.to_string(), "API error 500: boom");
    }
}
