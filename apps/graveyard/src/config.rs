//! # Service Settings
//!
//! Settings are read from an optional TOML file and then overridden from the
//! environment. Every section is optional; a missing file section keeps its
//! defaults.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 80
//!
//! [sparql]
//! endpoint = "http://database:8890/sparql"
//! timeout_secs = 60
//!
//! [vocabulary]
//! graveyard_graph = "http://mu.semte.ch/graphs/graveyard/mandatarissen"
//!
//! [plan]
//! remove_live_triples = "as_user"
//! copy_to_graveyard = "privileged"
//! reclassify = "privileged"
//!
//! [policy]
//! on_privileged_denial = "abort"
//! ```
//!
//! ## Environment Overrides
//!
//! - `MU_SPARQL_ENDPOINT`: SPARQL endpoint URL

use graveyard_core::{DenialPolicy, ExecutionPlan, GraveyardError, Vocabulary};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the SPARQL endpoint.
pub const SPARQL_ENDPOINT_ENV: &str = "MU_SPARQL_ENDPOINT";

/// Default SPARQL endpoint inside a mu-semtech stack.
pub const DEFAULT_SPARQL_ENDPOINT: &str = "http://database:8890/sparql";

/// Maximum settings file size (1 MB).
const MAX_SETTINGS_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// SECTIONS
// =============================================================================

/// `[server]`
///
/// Defaults to every interface on port 80, as in a mu-semtech stack. Local
/// runs override it with `--host` and `--port`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 80,
        }
    }
}

/// `[sparql]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparqlSettings {
    pub endpoint: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SparqlSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SPARQL_ENDPOINT.to_string(),
            timeout_secs: 60,
        }
    }
}

/// `[policy]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    pub on_privileged_denial: DenialPolicy,
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Complete service settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub sparql: SparqlSettings,
    pub vocabulary: Vocabulary,
    pub plan: ExecutionPlan,
    pub policy: PolicySettings,
}

impl Settings {
    /// Parse settings from TOML text, without environment overrides.
    pub fn from_toml_str(text: &str) -> Result<Self, GraveyardError> {
        toml::from_str(text).map_err(|e| GraveyardError::ConfigError(e.to_string()))
    }

    /// Load settings from an optional file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, GraveyardError> {
        let mut settings = match path {
            Some(path) => {
                let metadata = std::fs::metadata(path).map_err(|e| {
                    GraveyardError::ConfigError(format!(
                        "Cannot read settings '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                if metadata.len() > MAX_SETTINGS_FILE_SIZE {
                    return Err(GraveyardError::ConfigError(format!(
                        "Settings file '{}' exceeds {} bytes",
                        path.display(),
                        MAX_SETTINGS_FILE_SIZE
                    )));
                }
                let text = std::fs::read_to_string(path)
                    .map_err(|e| GraveyardError::IoError(e.to_string()))?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        settings.apply_env();
        Ok(settings)
    }

    /// Apply environment overrides.
    fn apply_env(&mut self) {
        if let Some(endpoint) = std::env::var(SPARQL_ENDPOINT_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        {
            self.sparql.endpoint = endpoint;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use graveyard_core::{Capability, Step};
    use std::io::Write;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn empty_text_gives_defaults() {
        let settings = Settings::from_toml_str("").expect("parse");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.policy.on_privileged_denial, DenialPolicy::Abort);
    }

    #[test]
    fn default_bind_listens_on_all_interfaces_port_80() {
        let server = ServerSettings::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 80);
    }

    #[test]
    fn sections_override_individually() {
        let settings = Settings::from_toml_str(
            r#"
            [server]
            port = 9000

            [vocabulary]
            archive_note = "Removed upstream."

            [plan]
            reclassify = "as_user"

            [policy]
            on_privileged_denial = "log"
            "#,
        )
        .expect("parse");

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.vocabulary.archive_note, "Removed upstream.");
        assert_eq!(
            settings.vocabulary.graveyard_graph,
            Vocabulary::default().graveyard_graph
        );
        assert_eq!(settings.plan.capability(Step::Reclassify), Capability::AsUser);
        assert_eq!(settings.plan.capability(Step::Annotate), Capability::Privileged);
        assert_eq!(settings.policy.on_privileged_denial, DenialPolicy::Log);
    }

    #[test]
    fn invalid_iri_in_vocabulary_is_a_config_error() {
        let result = Settings::from_toml_str(
            r#"
            [vocabulary]
            graveyard_graph = "not an iri"
            "#,
        );
        assert!(matches!(result, Err(GraveyardError::ConfigError(_))));
    }

    #[test]
    fn environment_overrides_endpoint() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "[sparql]\nendpoint = \"http://file:8890/sparql\"").expect("write");

        // SAFETY: serialized by ENV_MUTEX.
        unsafe { std::env::set_var(SPARQL_ENDPOINT_ENV, "http://env:8890/sparql") };
        let settings = Settings::load(Some(file.path())).expect("load");
        // SAFETY: serialized by ENV_MUTEX.
        unsafe { std::env::remove_var(SPARQL_ENDPOINT_ENV) };

        assert_eq!(settings.sparql.endpoint, "http://env:8890/sparql");
    }

    #[test]
    fn missing_file_is_reported() {
        let result = Settings::load(Some(Path::new("/nonexistent/graveyard.toml")));
        assert!(matches!(result, Err(GraveyardError::ConfigError(_))));
    }
}
