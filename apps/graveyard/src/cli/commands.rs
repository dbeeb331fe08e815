//! # CLI Command Implementations

use crate::api::{self, AppState};
use crate::archive::{ArchiveReport, Archiver};
use crate::backend::Backend;
use crate::config::Settings;
use crate::sparql::UserContext;
use graveyard_core::{Capability, GraveyardError, Quad, Store};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

// =============================================================================
// FILE LIMITS
// =============================================================================

/// Maximum size of a JSON quad file (100 MB).
const MAX_QUAD_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Resolve a readable regular file, rejecting oversized ones.
fn validate_input_file(path: &Path) -> Result<PathBuf, GraveyardError> {
    let canonical = path.canonicalize().map_err(|e| {
        GraveyardError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;
    if !canonical.is_file() {
        return Err(GraveyardError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }
    let len = std::fs::metadata(&canonical)
        .map_err(|e| GraveyardError::IoError(format!("Cannot read file metadata: {}", e)))?
        .len();
    if len > MAX_QUAD_FILE_SIZE {
        return Err(GraveyardError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            len, MAX_QUAD_FILE_SIZE
        )));
    }
    Ok(canonical)
}

/// Read a JSON array of quads.
pub fn read_quads(path: &Path) -> Result<Vec<Quad>, GraveyardError> {
    let path = validate_input_file(path)?;
    let text = std::fs::read_to_string(&path).map_err(|e| GraveyardError::IoError(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| GraveyardError::SerializationError(e.to_string()))
}

/// The local store of a backend, or an error naming the command.
fn local_store<'a>(
    backend: &'a Backend,
    command: &str,
) -> Result<&'a Arc<Mutex<Store>>, GraveyardError> {
    backend.store().ok_or_else(|| {
        GraveyardError::ConfigError(format!(
            "`{}` needs a local backend (--backend memory or --backend redb)",
            command
        ))
    })
}

/// Build the archiver described by the settings.
pub fn archiver_from(settings: &Settings) -> Archiver {
    Archiver::new(
        settings.vocabulary.clone(),
        settings.plan.clone(),
        settings.policy.on_privileged_denial,
    )
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_serve(
    settings: Settings,
    backend: Backend,
    host: Option<String>,
    port: Option<u16>,
    seed: Option<&Path>,
) -> Result<(), GraveyardError> {
    if let Some(seed) = seed {
        let quads = read_quads(seed)?;
        local_store(&backend, "serve --seed")?
            .lock()
            .await
            .load(&quads)?;
        tracing::info!(quads = quads.len(), "Seeded local store");
    }

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    println!("Graveyard Service Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:      {}", host);
    println!("  Port:      {}", port);
    println!("  Backend:   {}", backend.name());
    if let Backend::Sparql(client) = &backend {
        println!("  Endpoint:  {}", client.endpoint());
    }
    println!("  Graveyard: {}", settings.vocabulary.graveyard_graph);
    println!();
    println!("Endpoints:");
    println!("  DELETE /{{id}}/archive - Archive a mandataris");
    println!("  GET    /health        - Health check");
    println!();

    let state = AppState::new(archiver_from(&settings), backend);
    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, state).await
}

// =============================================================================
// ARCHIVE COMMAND
// =============================================================================

fn print_report(report: &ArchiveReport) {
    println!("Identifier: {}", report.identifier);
    if let Some(subject) = &report.subject {
        println!("Subject:    {}", subject);
    }
    if let Some(duplicate) = &report.duplicate {
        println!("Duplicate:  {}", duplicate);
    }
    println!("State:      {}", report.state);
    println!();
    for record in &report.trail {
        println!(
            "  {:<24} {:<10} {:?}",
            record.step.name(),
            format!("{:?}", record.capability),
            record.outcome
        );
    }
}

/// Archive one mandataris from the command line.
///
/// Runs without a user session: against a SPARQL endpoint the as-user steps
/// are subject to whatever access the anonymous user has.
pub async fn cmd_archive(
    settings: &Settings,
    backend: &Backend,
    identifier: &str,
    json_mode: bool,
) -> Result<(), GraveyardError> {
    let archiver = archiver_from(settings);
    let user = UserContext::default();
    let as_user = backend.executor(Capability::AsUser, &user);
    let privileged = backend.executor(Capability::Privileged, &user);

    let outcome = archiver
        .archive(identifier, as_user.as_ref(), privileged.as_ref())
        .await;
    let report = match &outcome {
        Ok(report) => report,
        Err(failure) => &failure.report,
    };

    if json_mode {
        let output = serde_json::json!({
            "archived": outcome.is_ok(),
            "error": outcome.as_ref().err().map(|f| f.error.to_string()),
            "report": report,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        print_report(report);
    }

    outcome
        .map(|_| ())
        .map_err(|failure| GraveyardError::ArchiveFailed(failure.error.to_string()))
}

// =============================================================================
// LOAD / DUMP COMMANDS
// =============================================================================

/// Load quads into a local backend.
pub async fn cmd_load(backend: &Backend, file: &Path, json_mode: bool) -> Result<(), GraveyardError> {
    let store = local_store(backend, "load")?;
    let quads = read_quads(file)?;
    let mut store = store.lock().await;
    store.load(&quads)?;
    let total = graveyard_core::QuadStore::quad_count(&*store)?;

    if json_mode {
        let output = serde_json::json!({ "loaded": quads.len(), "total": total });
        println!("{}", output);
    } else {
        println!("Loaded {} quads ({} in store)", quads.len(), total);
    }
    Ok(())
}

/// Print every quad of a local backend.
pub async fn cmd_dump(backend: &Backend) -> Result<(), GraveyardError> {
    let store = local_store(backend, "dump")?;
    let quads = store.lock().await.all()?;
    let text = serde_json::to_string_pretty(&quads)
        .map_err(|e| GraveyardError::SerializationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}
