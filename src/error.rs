//! Application error types.
//!
//! The taxonomy distinguishes configuration failures (script missing,
//! ambiguous graph, no path), which surface before any mutation, from
//! mid-run failures (script execution, data migration, precondition
//! stops), which halt the chain at the failing edge.

use std::path::PathBuf;

use thiserror::Error;

use crate::upgrade::graph::Precedence;
use crate::version::Version;

/// Application-level errors for Ladder.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Invalid version '{input}': {reason}")]
    VersionParse { input: String, reason: String },

    #[error("Script not found: '{name}' (searched {searched})")]
    ScriptNotFound { name: String, searched: String },

    #[error("Failed to read script '{name}' from {path}")]
    ScriptRead {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Upgrade step {from} -> {to} does not advance the installed version")]
    InvalidEdge { from: Version, to: Version },

    #[error("Duplicate upgrade step registered for {from} -> {to} at {precedence:?} precedence")]
    DuplicateEdge {
        from: Version,
        to: Version,
        precedence: Precedence,
    },

    #[error("No upgrade path from {installed} to {target} (no applicable step at {stalled_at})")]
    NoPath {
        installed: Version,
        target: Version,
        stalled_at: Version,
    },

    /// A prepare or cleanup statement failed. Statement indexes are 1-based.
    #[error("Script '{script}' failed at statement {statement}")]
    ScriptExecution {
        script: String,
        statement: usize,
        #[source]
        source: Box<AppError>,
    },

    #[error("Data migration failed: {0}")]
    DataMigration(String),

    /// A deliberate hard stop raised by a step: an unmet precondition the
    /// operator must fix manually. The message is surfaced verbatim.
    #[error("{0}")]
    Precondition(String),

    #[error("Upgrade halted applying {from} -> {to}")]
    Halted {
        from: Version,
        to: Version,
        #[source]
        source: Box<AppError>,
    },

    #[error("Ledger is not initialized. Run `ladder init --version <installed>` first.")]
    NotInitialized,

    #[error("Database error: {0}")]
    Db(String),
}
