//! Unit tests for API and report serialization.

#![allow(clippy::unwrap_used, clippy::panic)]

use graveyard::api::{ErrorObject, ErrorResponse, HealthResponse};
use graveyard::archive::{Archiver, LocalExecutor};
use graveyard_core::{Capability, Iri, Literal, Quad, Store, Vocabulary};
use std::sync::Arc;
use tokio::sync::Mutex;

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_ok() {
    let health = HealthResponse::ok("sparql");
    assert_eq!(health.status, "ok");
    assert_eq!(health.backend, "sparql");
    assert!(!health.version.is_empty());
}

#[test]
fn test_health_response_serialization() {
    let health = HealthResponse {
        status: "ok".to_string(),
        version: "0.3.0".to_string(),
        backend: "local".to_string(),
    };

    let json = serde_json::to_string(&health).unwrap();
    assert!(json.contains("\"status\":\"ok\""));
    assert!(json.contains("\"version\":\"0.3.0\""));
    assert!(json.contains("\"backend\":\"local\""));
}

// =============================================================================
// ERROR RESPONSE TESTS
// =============================================================================

#[test]
fn test_error_response_shape() {
    let error = ErrorResponse::single("Archive of 'abc-123' failed at redirect_references");

    let value = serde_json::to_value(&error).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "errors": [{"title": "Archive of 'abc-123' failed at redirect_references"}]
        })
    );
}

#[test]
fn test_error_response_deserialization() {
    let json = r#"{"errors":[{"title":"first"},{"title":"second"}]}"#;
    let error: ErrorResponse = serde_json::from_str(json).unwrap();

    assert_eq!(
        error.errors,
        vec![
            ErrorObject {
                title: "first".to_string()
            },
            ErrorObject {
                title: "second".to_string()
            },
        ]
    );
}

// =============================================================================
// ARCHIVE REPORT TESTS
// =============================================================================

#[tokio::test]
async fn test_archive_report_serialization() {
    let vocab = Vocabulary::default();
    let mut store = Store::in_memory();
    store
        .load(&[Quad::new(
            Iri::new("http://data.lblod.info/id/mandatarissen/e").unwrap(),
            vocab.identifier_predicate.clone(),
            Literal::plain("abc-123"),
            Iri::new("http://mu.semte.ch/graphs/public").unwrap(),
        )])
        .unwrap();
    let store = Arc::new(Mutex::new(store));
    let as_user = LocalExecutor::new(store.clone(), Capability::AsUser);
    let privileged = LocalExecutor::new(store, Capability::Privileged);

    let report = Archiver::default()
        .archive("abc-123", &as_user, &privileged)
        .await
        .unwrap();
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["identifier"], "abc-123");
    assert_eq!(value["subject"], "http://data.lblod.info/id/mandatarissen/e");
    assert!(value["duplicate"].is_null());
    assert_eq!(value["trail"][0]["step"], "locate");
    assert_eq!(value["trail"][2]["capability"], "as_user");
    assert_eq!(value["trail"][3]["capability"], "privileged");
}
