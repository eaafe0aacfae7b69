//! Error handling and custom error types
//!
//! Provides unified error handling across the relay and the uploader using
//! thiserror, plus the HTTP mapping used by the relay's handlers.

use crate::models::RelayResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The caller's upload was malformed (e.g. no `file` field).
    #[error("{0}")]
    BadRequest(String),

    /// The pinning provider answered with a non-success status; carries the raw body.
    #[error("Pinata error: {0}")]
    Upstream(String),

    #[error("Invalid pinning provider response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to relay clients. Local failures are not echoed back.
    fn user_message(&self) -> String {
        match self {
            Error::BadRequest(msg) | Error::Internal(msg) => msg.clone(),
            Error::Upstream(_) => self.to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::BadRequest(_) => tracing::debug!("Client error: {}", self),
            Error::Upstream(_) => tracing::warn!("Upstream error: {}", self),
            _ => tracing::error!("Internal relay error: {}", self),
        }

        let body = RelayResponse::Failure {
            error: self.user_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
