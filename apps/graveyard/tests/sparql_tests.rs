//! SPARQL executor tests against a mock endpoint.
//!
//! The mock records every request and answers like a mu-authorization
//! endpoint: updates without a session or sudo header are refused with 403.

#![allow(clippy::unwrap_used, clippy::panic)]

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use graveyard::archive::{ExecutorError, QueryExecutor, SparqlExecutor};
use graveyard::sparql::{AuthContext, SparqlClient, SparqlError, UserContext};
use graveyard_core::{Iri, Literal, Quad, Vocabulary, statements};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const LIVE: &str = "http://mu.semte.ch/graphs/organizations/kortrijk/LoketLB-mandaatGebruiker";
const E: &str = "http://data.lblod.info/id/mandatarissen/e";

// =============================================================================
// MOCK ENDPOINT
// =============================================================================

#[derive(Debug, Clone)]
struct Recorded {
    headers: HeaderMap,
    body: String,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

async fn sparql(State(log): State<Log>, headers: HeaderMap, body: String) -> Response {
    log.lock().unwrap().push(Recorded {
        headers: headers.clone(),
        body,
    });

    match header_value(&headers, "content-type") {
        Some("application/sparql-query") => {
            let results = serde_json::json!({
                "head": {"vars": ["s", "g"]},
                "results": {"bindings": [{
                    "s": {"type": "uri", "value": E},
                    "g": {"type": "uri", "value": LIVE}
                }]}
            });
            (
                [(header::CONTENT_TYPE, "application/sparql-results+json")],
                results.to_string(),
            )
                .into_response()
        }
        Some("application/sparql-update") => {
            let sudo = header_value(&headers, "mu-auth-sudo") == Some("true");
            let session = headers.contains_key("mu-session-id");
            if sudo || session {
                StatusCode::NO_CONTENT.into_response()
            } else {
                StatusCode::FORBIDDEN.into_response()
            }
        }
        _ => StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response(),
    }
}

async fn broken() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "virtuoso fell over").into_response()
}

async fn spawn_endpoint() -> (String, Log) {
    let log: Log = Arc::default();
    let router = Router::new()
        .route("/sparql", post(sparql))
        .route("/broken", post(broken))
        .with_state(log.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{}", addr), log)
}

fn client(url: String) -> Arc<SparqlClient> {
    Arc::new(SparqlClient::new(url, Duration::from_secs(5)).unwrap())
}

fn session_user() -> UserContext {
    UserContext {
        session_id: Some("http://mu.semte.ch/sessions/1".to_string()),
        call_id: Some("7".to_string()),
        allowed_groups: None,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[tokio::test]
async fn query_forwards_user_identity() {
    let (base, log) = spawn_endpoint().await;
    let vocab = Vocabulary::default();
    let executor = SparqlExecutor::new(
        client(format!("{}/sparql", base)),
        AuthContext::User(session_user()),
    );

    let found = executor
        .read(&statements::locate(&vocab, "abc-123"))
        .await
        .unwrap();

    assert_eq!(
        found,
        vec![Quad::new(
            Iri::new(E).unwrap(),
            vocab.identifier_predicate.clone(),
            Literal::plain("abc-123"),
            Iri::new(LIVE).unwrap(),
        )]
    );

    let requests = log.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(
        header_value(&request.headers, "accept"),
        Some("application/sparql-results+json")
    );
    assert_eq!(
        header_value(&request.headers, "mu-session-id"),
        Some("http://mu.semte.ch/sessions/1")
    );
    assert_eq!(header_value(&request.headers, "mu-call-id"), Some("7"));
    assert!(!request.headers.contains_key("mu-auth-sudo"));
    assert!(request.body.starts_with("SELECT DISTINCT"));
    assert!(request.body.contains("\"abc-123\""));
}

#[tokio::test]
async fn privileged_update_sends_sudo_only() {
    let (base, log) = spawn_endpoint().await;
    let vocab = Vocabulary::default();
    let executor = SparqlExecutor::new(client(format!("{}/sparql", base)), AuthContext::Privileged);
    let subject = Iri::new(E).unwrap();

    let acknowledged = executor
        .write(&statements::reclassify(&vocab, &subject))
        .await
        .unwrap();

    assert!(acknowledged);
    let requests = log.lock().unwrap().clone();
    let request = &requests[0];
    assert_eq!(header_value(&request.headers, "mu-auth-sudo"), Some("true"));
    assert!(!request.headers.contains_key("mu-session-id"));
    assert!(request.body.contains(vocab.archived_class.as_str()));
}

#[tokio::test]
async fn refused_update_is_not_acknowledged() {
    let (base, _log) = spawn_endpoint().await;
    let vocab = Vocabulary::default();
    let executor = SparqlExecutor::new(
        client(format!("{}/sparql", base)),
        AuthContext::User(UserContext::default()),
    );

    let acknowledged = executor
        .write(&statements::remove_live_triples(&vocab, &Iri::new(E).unwrap()))
        .await
        .unwrap();

    assert!(!acknowledged);
}

#[tokio::test]
async fn server_error_is_reported_with_body() {
    let (base, _log) = spawn_endpoint().await;
    let vocab = Vocabulary::default();
    let executor = SparqlExecutor::new(client(format!("{}/broken", base)), AuthContext::Privileged);

    let result = executor
        .write(&statements::annotate(&vocab, &Iri::new(E).unwrap()))
        .await;

    match result {
        Err(ExecutorError::Sparql(SparqlError::Status { status, body })) => {
            assert_eq!(status, 500);
            assert_eq!(body, "virtuoso fell over");
        }
        other => panic!("expected a status error, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_endpoint_is_a_connection_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let sparql = client(format!("http://{}/sparql", addr));
    let result = sparql
        .query(&AuthContext::Privileged, "SELECT * WHERE { ?s ?p ?o }".to_string())
        .await;

    assert!(matches!(result, Err(SparqlError::Connection { .. })));
}
