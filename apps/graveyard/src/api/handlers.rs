//! # API Endpoint Handlers

use super::{
    AppState,
    types::{ErrorResponse, HealthResponse},
};
use crate::sparql::{MU_AUTH_ALLOWED_GROUPS, MU_CALL_ID, MU_SESSION_ID, UserContext};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use graveyard_core::Capability;

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse::ok(state.backend.name()))
}

// =============================================================================
// ARCHIVE HANDLER
// =============================================================================

/// Extract the caller's identity headers.
pub fn user_context(headers: &HeaderMap) -> UserContext {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    UserContext {
        session_id: header(MU_SESSION_ID),
        call_id: header(MU_CALL_ID),
        allowed_groups: header(MU_AUTH_ALLOWED_GROUPS),
    }
}

/// Archive the mandataris carrying `id`.
///
/// - `204 No Content` once archived
/// - `404 Not Found` (no body) if `id` resolves to nothing
/// - `400 Bad Request` with an error body if any later step fails
pub async fn archive_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let user = user_context(&headers);
    let as_user = state.backend.executor(Capability::AsUser, &user);
    let privileged = state.backend.executor(Capability::Privileged, &user);

    match state
        .archiver
        .archive(&id, as_user.as_ref(), privileged.as_ref())
        .await
    {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(failure) if failure.is_not_found() => StatusCode::NOT_FOUND.into_response(),
        Err(failure) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::single(failure.error.to_string())),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn user_context_reads_mu_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(MU_SESSION_ID, HeaderValue::from_static("http://mu.semte.ch/sessions/1"));
        headers.insert(MU_CALL_ID, HeaderValue::from_static("42"));

        let user = user_context(&headers);
        assert_eq!(user.session_id.as_deref(), Some("http://mu.semte.ch/sessions/1"));
        assert_eq!(user.call_id.as_deref(), Some("42"));
        assert_eq!(user.allowed_groups, None);
    }
}
