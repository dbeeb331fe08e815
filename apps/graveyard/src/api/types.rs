//! # API Response Types
//!
//! JSON bodies of the HTTP API. Successful archives have no body.

use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
}

impl HealthResponse {
    /// A healthy response for the given backend.
    pub fn ok(backend: &str) -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            backend: backend.to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// One entry of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub title: String,
}

/// Error body: `{ "errors": [{ "title": "..." }] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorObject>,
}

impl ErrorResponse {
    /// A response carrying a single error.
    pub fn single(title: impl Into<String>) -> Self {
        Self {
            errors: vec![ErrorObject {
                title: title.into(),
            }],
        }
    }
}
