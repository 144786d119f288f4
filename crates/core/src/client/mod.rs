//! Typed client for the BDthèque REST backend.
//!
//! Public catalog endpoints need no credentials; the `/admin/...` endpoints
//! require a bearer token supplied by a [`CredentialProvider`](crate::session::CredentialProvider).

mod http;
mod sources;

pub use http::BdthequeClient;
pub use sources::{AdminCatalog, AdminMembers, AvailableBds, PublicCatalog};

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection refused, timeout, ...).
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Credential missing, expired or rejected (401/403).
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing token, bad base URL, ...).
    #[error("Client not configured: {0}")]
    NotConfigured(String),

    /// Draft rejected before sending.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

impl ApiError {
    /// True for failures the presentation layer should treat as "log in again".
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_) | ApiError::NotConfigured(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldError;

    #[test]
    fn test_auth_error_classification() {
        assert!(ApiError::Unauthorized("expired".to_string()).is_auth_error());
        assert!(ApiError::NotConfigured("no token".to_string()).is_auth_error());
        assert!(!ApiError::NotFound("bd".to_string()).is_auth_error());
    }

    #[test]
    fn test_validation_error_is_transparent() {
        let err = ApiError::from(ValidationErrors {
            fields: vec![FieldError {
                field: "cote",
                message: "La cote est obligatoire".to_string(),
            }],
        });
        assert_eq!(err.to_string(), "invalid form: cote: La cote est obligatoire");
    }
}
