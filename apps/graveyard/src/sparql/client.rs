//! # SPARQL HTTP Client
//!
//! Posts queries and updates to the endpoint as SPARQL 1.1 Protocol
//! direct-body requests.

use super::{AuthContext, parse_results};
use graveyard_core::{GraveyardError, Solution};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;
use thiserror::Error;

const SPARQL_QUERY: &str = "application/sparql-query";
const SPARQL_UPDATE: &str = "application/sparql-update";
const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Errors from the SPARQL client layer.
#[derive(Debug, Error)]
pub enum SparqlError {
    /// The endpoint could not be reached or the request timed out.
    #[error("Cannot reach SPARQL endpoint {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    /// The endpoint answered with an error status.
    #[error("SPARQL endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be understood.
    #[error("Malformed SPARQL response: {0}")]
    Response(String),

    /// A bound term is not a valid term.
    #[error(transparent)]
    Term(#[from] GraveyardError),
}

/// HTTP client for one SPARQL endpoint.
#[derive(Debug, Clone)]
pub struct SparqlClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SparqlClient {
    /// Create a client with a per-request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SparqlError> {
        let endpoint = endpoint.into();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SparqlError::Connection {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { http, endpoint })
    }

    /// The endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build a request carrying the auth context headers.
    fn request(&self, auth: &AuthContext, content_type: &'static str, body: String) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, content_type)
            .body(body);
        for (name, value) in auth.headers() {
            req = req.header(name, value);
        }
        req
    }

    /// Send a request and handle connection errors.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, SparqlError> {
        req.send().await.map_err(|e| SparqlError::Connection {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })
    }

    /// Run a SELECT query.
    pub async fn query(&self, auth: &AuthContext, text: String) -> Result<Vec<Solution>, SparqlError> {
        tracing::debug!(endpoint = %self.endpoint, query = %text, "SPARQL query");
        let req = self
            .request(auth, SPARQL_QUERY, text)
            .header(ACCEPT, SPARQL_RESULTS_JSON);
        let resp = self.send(req).await?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| SparqlError::Response(e.to_string()))?;
        if !status.is_success() {
            return Err(SparqlError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_results(&body)
    }

    /// Run an update. Returns whether the endpoint acknowledged it.
    ///
    /// 401 and 403 mean the update was refused by access control; any other
    /// non-2xx status is an error.
    pub async fn update(&self, auth: &AuthContext, text: String) -> Result<bool, SparqlError> {
        tracing::debug!(endpoint = %self.endpoint, update = %text, "SPARQL update");
        let req = self.request(auth, SPARQL_UPDATE, text);
        let resp = self.send(req).await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(true);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(false);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(SparqlError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
