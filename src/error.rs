//! # Error Handling
//!
//! This module defines the server's error type and how it is converted to HTTP responses.
//!
//! Query rejections keep the voice-command contract and answer with `{ "reply": ... }`,
//! so a client can read and speak the apology like any other reply.
//!
//! Startup failures (config loading, binding) are reported through `anyhow` in `main`
//! before any request is served. Client-side failures (backend calls, capture) live in
//! [`crate::client`] and never reach this type.

use actix_web::{HttpResponse, ResponseError};  // Web framework error handling
use serde_json::json;                          // For creating JSON error responses
use std::fmt;                                  // For implementing Display trait

/// Apology sent when a voice command has no usable query.
pub const INVALID_QUERY_REPLY: &str = "I did not receive a valid query.";

/// Errors a request handler can return.
///
/// ## Error Categories:
/// - **InvalidQuery**: Missing, non-string, blank query or unreadable body (400)
#[derive(Debug)]
pub enum AppError {
    /// The request did not carry a usable `query` string
    InvalidQuery(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidQuery(msg) => write!(f, "Invalid query: {}", msg),
        }
    }
}

/// Converts errors into HTTP responses.
///
/// ## HTTP Status Code Mapping:
/// - InvalidQuery → 400 with `{ "reply": "I did not receive a valid query." }`
impl ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            AppError::InvalidQuery(_) => actix_web::http::StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // The detail is only logged; the client always gets the fixed apology.
            AppError::InvalidQuery(_) => {
                HttpResponse::build(self.status_code()).json(json!({ "reply": INVALID_QUERY_REPLY }))
            }
        }
    }
}

/// Shorthand for `Result<T, AppError>`.
pub type AppResult<T> = Result<T, AppError>;
