// src/error.rs
//! Error taxonomy for attestation issuance.
//!
//! A failed signature check is not an error: `verify` returns `false` for that
//! outcome. Everything here is a request that could not be answered at all.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttestationError {
    /// Missing or malformed input. User-correctable.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The policy id is not registered with the evaluator.
    #[error("unknown policy: {0}")]
    UnknownPolicy(String),

    /// A required attribute is absent or out of range.
    #[error("invalid attributes: {0}")]
    InvalidAttributes(String),

    /// Key material is missing or malformed. Fatal at startup.
    #[error("signing unavailable: {0}")]
    SigningUnavailable(String),

    /// Unexpected failure. The detail stays in the server log.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type AttestationResult<T> = Result<T, AttestationError>;

impl AttestationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::UnknownPolicy(_) => StatusCode::BAD_REQUEST,
            Self::InvalidAttributes(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::SigningUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AttestationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Self::Internal(detail) => {
                log::error!("attestation request failed: {}", detail);
                "Internal server error".to_string()
            }
            Self::SigningUnavailable(detail) => {
                log::error!("signer unavailable: {}", detail);
                "Signing unavailable".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
