//! # Authentication Module
//!
//! Optional bearer API key in front of the archive endpoint.
//!
//! - `GRAVEYARD_API_KEY`: if set, every request except `/health` must send
//!   `Authorization: Bearer <key>`
//!
//! In a mu-semtech stack the dispatcher and identifier already sit in front of
//! the service, so the key is normally left unset.

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GRAVEYARD_API_KEY";

// =============================================================================
// API KEY AUTHENTICATION
// =============================================================================

/// Get the API key, `None` when unset or empty.
pub fn get_api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty())
}

/// Compare keys in constant time over the longer of the two lengths.
fn keys_match(provided: &[u8], expected: &[u8]) -> bool {
    let len = provided.len().max(expected.len());
    let mut left = vec![0u8; len];
    let mut right = vec![0u8; len];
    left[..provided.len()].copy_from_slice(provided);
    right[..expected.len()].copy_from_slice(expected);

    let same_bytes: bool = left.ct_eq(&right).into();
    same_bytes && provided.len() == expected.len()
}

/// API key authentication middleware.
pub async fn api_key_auth_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    let Some(expected) = get_api_key_from_env() else {
        return Ok(next.run(request).await);
    };

    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v));

    match provided {
        Some(key) if keys_match(key.as_bytes(), expected.as_bytes()) => {
            Ok(next.run(request).await)
        }
        Some(_) => {
            tracing::warn!(
                event = "auth_failure",
                reason = "invalid_api_key",
                "Authentication failed: invalid API key"
            );
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
        None => {
            tracing::warn!(
                event = "auth_failure",
                reason = "missing_authorization_header",
                "Missing Authorization header"
            );
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_keys_match() {
        assert!(keys_match(b"secret", b"secret"));
    }

    #[test]
    fn prefix_does_not_match() {
        assert!(!keys_match(b"secre", b"secret"));
        assert!(!keys_match(b"secret-and-more", b"secret"));
        assert!(!keys_match(b"", b"secret"));
    }
}
