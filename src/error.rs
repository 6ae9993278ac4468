//! Error handling and custom error types
//!
//! Provides unified error handling across the relay using thiserror, plus the
//! JSON error envelope returned at the HTTP boundary.

use crate::models::ErrorBody;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::error::Error as StdError;
use std::fmt::Write as _;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),
}

impl Error {
    /// Renders the error followed by its `source()` chain, one cause per line.
    pub fn trace(&self) -> String {
        let mut out = format!("Error: {}", self);
        let mut source = StdError::source(self);
        while let Some(cause) = source {
            let _ = write!(out, "\n    caused by: {}", cause);
            source = cause.source();
        }
        out
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Error returned from HTTP handlers, rendered as `{"error": ..., "stack": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    stack: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            stack: None,
        }
    }

    /// A 500 carrying the failure's message only.
    pub fn internal(err: &Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
            stack: None,
        }
    }

    /// A 500 carrying the failure's message and its full diagnostic trace.
    pub fn internal_with_trace(err: &Error) -> Self {
        Self {
            stack: Some(err.trace()),
            ..Self::internal(err)
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Multipart(e) => Self {
                status: e.status(),
                message: e.body_text(),
                stack: None,
            },
            other => Self::internal(&other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
                stack: self.stack,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_walks_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "peer reset");
        let err = Error::from(io);

        let trace = err.trace();
        assert!(trace.starts_with("Error: IO error: peer reset"));
        assert!(trace.contains("caused by: peer reset"));
    }

    #[test]
    fn test_trace_without_source_is_single_line() {
        let err = Error::AiProvider("quota exceeded".to_string());
        assert_eq!(err.trace(), "Error: AI provider error: quota exceeded");
    }

    #[test]
    fn test_internal_omits_stack() {
        let err = Error::AiProvider("boom".to_string());
        let api = ApiError::internal(&err);
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message(), "AI provider error: boom");
        assert!(api.stack.is_none());
    }

    #[test]
    fn test_internal_with_trace_keeps_message() {
        let err = Error::AiProvider("boom".to_string());
        let api = ApiError::internal_with_trace(&err);
        assert_eq!(api.message(), "AI provider error: boom");
        assert_eq!(api.stack.as_deref(), Some("Error: AI provider error: boom"));
    }
}
