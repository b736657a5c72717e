//! The upgrade-chain core: version graph, step contract, ledger, and
//! orchestrator.
//!
//! Upgrades are:
//! - **Forward-only**: No rollback support - most engines auto-commit DDL,
//!   so a corrected re-run from the halt point is the recovery path
//! - **Fail-fast**: The first failing edge halts the whole chain
//! - **Version-tracked**: Applied steps are recorded in an append-only ledger
//! - **Resumable**: A re-run resolves from the ledger's recorded version,
//!   never re-applying completed edges

pub mod graph;
pub mod ledger;
pub mod orchestrator;
pub mod step;

pub use graph::{Precedence, UpgradeEdge, VersionGraph};
pub use ledger::{LedgerEntry, MigrationLedger, SqlLedger, BASELINE_STEP_ID};
pub use orchestrator::{AppliedEdge, Orchestrator, PlannedEdge, UpgradePlan, UpgradeReport};
pub use step::{ScriptedStep, UpgradeStep};
