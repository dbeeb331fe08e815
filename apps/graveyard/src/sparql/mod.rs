//! # SPARQL Endpoint Access
//!
//! HTTP client for a mu-semtech SPARQL endpoint, with the authorization
//! context each request runs under.
//!
//! ## Authorization Headers
//!
//! - As-user requests forward `mu-session-id`, `mu-call-id` and
//!   `mu-auth-allowed-groups` from the incoming request, so the endpoint's
//!   access control sees the caller.
//! - Privileged requests send `mu-auth-sudo: true` and nothing else.

mod client;
mod results;

pub use client::{SparqlClient, SparqlError};
pub use results::parse_results;

/// Header carrying the caller's session.
pub const MU_SESSION_ID: &str = "mu-session-id";
/// Header carrying the caller's request id.
pub const MU_CALL_ID: &str = "mu-call-id";
/// Header carrying the caller's resolved access groups.
pub const MU_AUTH_ALLOWED_GROUPS: &str = "mu-auth-allowed-groups";
/// Header bypassing access control.
pub const MU_AUTH_SUDO: &str = "mu-auth-sudo";

/// Identity of the requesting user, as forwarded by the identifier service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserContext {
    pub session_id: Option<String>,
    pub call_id: Option<String>,
    pub allowed_groups: Option<String>,
}

impl UserContext {
    /// Header pairs to forward, skipping unset values.
    pub fn headers(&self) -> Vec<(&'static str, &str)> {
        [
            (MU_SESSION_ID, self.session_id.as_deref()),
            (MU_CALL_ID, self.call_id.as_deref()),
            (MU_AUTH_ALLOWED_GROUPS, self.allowed_groups.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }
}

/// Authorization context of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// Subject to access control for this user.
    User(UserContext),
    /// Bypasses access control.
    Privileged,
}

impl AuthContext {
    /// Header pairs for this context.
    pub fn headers(&self) -> Vec<(&'static str, &str)> {
        match self {
            AuthContext::User(user) => user.headers(),
            AuthContext::Privileged => vec![(MU_AUTH_SUDO, "true")],
        }
    }
}
