//! Integration tests for the graveyard HTTP API.
//!
//! Uses axum-test against a memory-backed router, so no SPARQL endpoint is
//! needed.

// Allow holding MutexGuard across await in auth tests - env var access is serialized
#![allow(clippy::unwrap_used, clippy::panic, clippy::await_holding_lock)]

use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum_test::TestServer;
use graveyard::api::{API_KEY_ENV, AppState, ErrorResponse, HealthResponse, create_router};
use graveyard::archive::Archiver;
use graveyard::backend::Backend;
use graveyard_core::{
    Capability, DenialPolicy, ExecutionPlan, GraphScope, Iri, Literal, Quad, QuadPattern, QuadStore,
    Store, Term, Vocabulary,
};
use std::sync::Mutex;

/// Mutex to serialize tests since some of them modify env vars.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const LIVE: &str = "http://mu.semte.ch/graphs/organizations/kortrijk/LoketLB-mandaatGebruiker";
const E: &str = "http://data.lblod.info/id/mandatarissen/e";

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

struct TestGuard {
    _guard: std::sync::MutexGuard<'static, ()>,
}

impl Drop for TestGuard {
    fn drop(&mut self) {
        // SAFETY: Tests run sequentially under ENV_MUTEX, so no concurrent env access.
        unsafe { std::env::remove_var(API_KEY_ENV) };
    }
}

fn lock_env() -> TestGuard {
    let guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: Tests run sequentially under ENV_MUTEX, so no concurrent env access.
    unsafe { std::env::remove_var(API_KEY_ENV) };
    TestGuard { _guard: guard }
}

fn seeded_backend() -> Backend {
    let vocab = Vocabulary::default();
    let subject = Iri::new(E).unwrap();
    let graph = Iri::new(LIVE).unwrap();
    let mut store = Store::in_memory();
    store
        .load(&[
            Quad::new(
                subject.clone(),
                vocab.identifier_predicate.clone(),
                Literal::plain("abc-123"),
                graph.clone(),
            ),
            Quad::new(
                subject,
                vocab.type_predicate.clone(),
                vocab.live_class.clone(),
                graph,
            ),
        ])
        .unwrap();
    Backend::local(store)
}

fn server_with(archiver: Archiver, backend: Backend) -> TestServer {
    TestServer::new(create_router(AppState::new(archiver, backend))).unwrap()
}

fn create_test_server() -> (TestServer, Backend, TestGuard) {
    let guard = lock_env();
    let backend = seeded_backend();
    (
        server_with(Archiver::default(), backend.clone()),
        backend,
        guard,
    )
}

async fn graveyard_quads(backend: &Backend) -> Vec<Quad> {
    let graveyard = Vocabulary::default().graveyard_graph;
    backend
        .store()
        .unwrap()
        .lock()
        .await
        .quads_matching(&QuadPattern::any().in_scope(GraphScope::Only(graveyard)))
        .unwrap()
}

// =============================================================================
// HEALTH ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _backend, _guard) = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(health.backend, "local");
}

// =============================================================================
// ARCHIVE ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_archive_returns_no_content() {
    let (server, backend, _guard) = create_test_server();

    let response = server.delete("/abc-123/archive").await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert!(response.text().is_empty());

    let archived = graveyard_quads(&backend).await;
    let vocab = Vocabulary::default();
    assert!(archived.iter().any(|q| q.object == Term::Iri(vocab.archived_class.clone())));
    assert!(
        archived
            .iter()
            .any(|q| q.predicate == vocab.history_note_predicate)
    );
}

#[tokio::test]
async fn test_archive_twice_still_succeeds() {
    let (server, _backend, _guard) = create_test_server();

    server
        .delete("/abc-123/archive")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .delete("/abc-123/archive")
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_archive_unknown_id_is_not_found() {
    let (server, backend, _guard) = create_test_server();

    let response = server.delete("/does-not-exist/archive").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.text().is_empty());
    assert!(graveyard_quads(&backend).await.is_empty());
}

#[tokio::test]
async fn test_archive_failure_is_bad_request() {
    let _guard = lock_env();
    let plan = ExecutionPlan {
        remove_live_triples: Capability::Privileged,
        ..ExecutionPlan::default()
    };
    let archiver = Archiver::new(Vocabulary::default(), plan, DenialPolicy::Abort);
    let server = server_with(archiver, seeded_backend());

    let response = server.delete("/abc-123/archive").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json();
    assert_eq!(body.errors.len(), 1);
    assert!(body.errors[0].title.contains("abc-123"));
}

#[tokio::test]
async fn test_archive_accepts_identity_headers() {
    let (server, _backend, _guard) = create_test_server();

    let response = server
        .delete("/abc-123/archive")
        .add_header(
            HeaderName::from_static("mu-session-id"),
            HeaderValue::from_static("http://mu.semte.ch/sessions/1"),
        )
        .add_header(
            HeaderName::from_static("mu-call-id"),
            HeaderValue::from_static("7"),
        )
        .await;

    response.assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_get_on_archive_route_not_allowed() {
    let (server, _backend, _guard) = create_test_server();

    let response = server.get("/abc-123/archive").await;

    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// AUTHENTICATION MIDDLEWARE TESTS
// =============================================================================

/// Must be called while holding ENV_MUTEX.
fn create_auth_test_server(api_key: &str) -> TestServer {
    // SAFETY: Tests run sequentially under ENV_MUTEX, so no concurrent env access.
    unsafe { std::env::set_var(API_KEY_ENV, api_key) };
    server_with(Archiver::default(), seeded_backend())
}

#[tokio::test]
async fn test_auth_valid_bearer_token() {
    let _guard = lock_env();
    let api_key = "test-secret-key-12345";
    let server = create_auth_test_server(api_key);

    let response = server
        .delete("/abc-123/archive")
        .add_header(
            header::AUTHORIZATION,
            format!("Bearer {}", api_key).parse::<HeaderValue>().unwrap(),
        )
        .await;

    response.assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_auth_missing_token_rejected() {
    let _guard = lock_env();
    let server = create_auth_test_server("correct-key");

    let response = server.delete("/abc-123/archive").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_invalid_token_rejected() {
    let _guard = lock_env();
    let server = create_auth_test_server("correct-key");

    let response = server
        .delete("/abc-123/archive")
        .add_header(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer wrong-key"),
        )
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_health_exempt() {
    let _guard = lock_env();
    let server = create_auth_test_server("correct-key");

    let response = server.get("/health").await;

    response.assert_status_ok();
}
