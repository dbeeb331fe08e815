//! # graveyard
//!
//! The graveyard service - THE SERVICE.
//!
//! Archives a mandate holder out of the live data into the graveyard graph,
//! resolving duplicates and keeping inbound references consistent.
//!
//! ## Modules
//!
//! - `api`: axum router for `DELETE /{id}/archive` and `GET /health`
//! - `archive`: the orchestrator and the query executors it drives
//! - `backend`: SPARQL endpoint or local store selection
//! - `cli`: clap commands
//! - `config`: TOML settings with environment overrides
//! - `sparql`: HTTP client for the SPARQL endpoint

pub mod api;
pub mod archive;
pub mod backend;
pub mod cli;
pub mod config;
pub mod sparql;
