//! The upgrade orchestrator: drives one full run from the recorded
//! version to a requested target.
//!
//! Per edge, in order: prepare scripts, data migration, cleanup scripts
//! inside one transaction; the ledger entry is appended in its own
//! transaction immediately after the edge commits. Most engines
//! auto-commit DDL, so edge-level atomicity cannot be promised in
//! general; the contract is that the ledger always records the last
//! *fully completed* edge, steps are written defensively (existence
//! checks before destructive operations), and a failed run halts for
//! operator remediation rather than retrying. A corrected re-run resumes
//! from the ledger's recorded version; completed edges are never re-run.

use crate::db::DbClient;
use crate::db::Transaction as _;
use crate::error::AppError;
use crate::scripts::{run_script, Script, ScriptLocator};
use crate::upgrade::graph::{UpgradeEdge, VersionGraph};
use crate::upgrade::ledger::MigrationLedger;
use crate::version::Version;

/// Result of a completed upgrade run.
#[derive(Debug, Clone)]
pub struct UpgradeReport {
    /// Installed version before the run.
    pub previous_version: Version,
    /// Installed version after the run.
    pub current_version: Version,
    /// Edges applied by this run, in order.
    pub applied: Vec<AppliedEdge>,
}

/// One edge applied during an upgrade run.
#[derive(Debug, Clone)]
pub struct AppliedEdge {
    pub from: Version,
    pub to: Version,
    pub step_id: String,
}

/// Dry-run description of what an upgrade would do.
#[derive(Debug, Clone)]
pub struct UpgradePlan {
    pub installed: Version,
    pub target: Version,
    pub edges: Vec<PlannedEdge>,
}

/// One edge of a dry-run plan, with its scripts already resolved.
#[derive(Debug, Clone)]
pub struct PlannedEdge {
    pub from: Version,
    pub to: Version,
    pub step_id: String,
    pub prepare: Vec<String>,
    pub cleanup: Vec<String>,
    /// Total statement count across prepare and cleanup scripts.
    pub statements: usize,
    pub rolling: bool,
}

/// An edge with all of its scripts located and parsed.
struct ResolvedEdge {
    edge: UpgradeEdge,
    prepare: Vec<Script>,
    cleanup: Vec<Script>,
}

/// Drives upgrade runs. Owns the database client, the script locator,
/// the version graph, and the ledger for the duration of a run; no
/// concurrent writers are assumed to be active against the schema (an
/// operational precondition, not enforced here).
pub struct Orchestrator<C, L> {
    client: C,
    locator: ScriptLocator,
    graph: VersionGraph,
    ledger: L,
}

impl<C, L> Orchestrator<C, L>
where
    C: DbClient,
    L: MigrationLedger,
{
    pub fn new(client: C, locator: ScriptLocator, graph: VersionGraph, ledger: L) -> Self {
        Self {
            client,
            locator,
            graph,
            ledger,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Upgrades the installation to exactly `target`.
    ///
    /// Edges apply in resolved order; the first failure halts the whole
    /// run wrapped in [`AppError::Halted`] with the failing edge's version
    /// range, and the ledger stays at the last fully completed edge.
    pub async fn upgrade(&self, target: Version) -> Result<UpgradeReport, AppError> {
        let installed = self
            .ledger
            .current_version()
            .await?
            .ok_or(AppError::NotInitialized)?;

        if installed == target {
            tracing::info!("already at {}, nothing to do", target);
            return Ok(UpgradeReport {
                previous_version: installed,
                current_version: installed,
                applied: Vec::new(),
            });
        }

        let path = self.resolve(installed, target)?;
        tracing::info!(
            "upgrading {} -> {} in {} step(s)",
            installed,
            target,
            path.len()
        );

        let mut applied = Vec::new();
        for resolved in &path {
            let (from, to) = (resolved.edge.from(), resolved.edge.to());
            let step = resolved.edge.step();
            tracing::info!("applying upgrade step {} ({} -> {})", step.id(), from, to);
            if !step.supports_rolling_upgrade() {
                tracing::info!(
                    "step {} is not rolling-upgrade safe; peers must be stopped",
                    step.id()
                );
            }

            let result = async {
                self.apply_edge(resolved).await?;
                self.ledger.append(to, step.id()).await?;
                Ok::<(), AppError>(())
            }
            .await;

            if let Err(cause) = result {
                match &cause {
                    AppError::Precondition(msg) => tracing::error!(
                        "upgrade stopped at {} -> {}: {} (operator action required)",
                        from,
                        to,
                        msg
                    ),
                    other => {
                        tracing::error!("upgrade halted at {} -> {}: {}", from, to, other)
                    }
                }
                return Err(AppError::Halted {
                    from,
                    to,
                    source: Box::new(cause),
                });
            }

            applied.push(AppliedEdge {
                from,
                to,
                step_id: step.id().to_string(),
            });
        }

        let final_version = self
            .ledger
            .current_version()
            .await?
            .ok_or(AppError::NotInitialized)?;
        if final_version != target {
            return Err(AppError::Db(format!(
                "ledger records {} after an upgrade to {}",
                final_version, target
            )));
        }

        tracing::info!("upgrade complete: {} -> {}", installed, target);
        Ok(UpgradeReport {
            previous_version: installed,
            current_version: final_version,
            applied,
        })
    }

    /// Resolves the path and scripts for an upgrade to `target` without
    /// executing anything or writing to the ledger.
    pub async fn plan(&self, target: Version) -> Result<UpgradePlan, AppError> {
        let installed = self
            .ledger
            .current_version()
            .await?
            .ok_or(AppError::NotInitialized)?;

        let path = if installed == target {
            Vec::new()
        } else {
            self.resolve(installed, target)?
        };

        Ok(UpgradePlan {
            installed,
            target,
            edges: path
                .iter()
                .map(|resolved| {
                    let step = resolved.edge.step();
                    PlannedEdge {
                        from: resolved.edge.from(),
                        to: resolved.edge.to(),
                        step_id: step.id().to_string(),
                        prepare: step.prepare_scripts(),
                        cleanup: step.cleanup_scripts(),
                        statements: resolved
                            .prepare
                            .iter()
                            .chain(&resolved.cleanup)
                            .map(|s| s.statements().len())
                            .sum(),
                        rolling: step.supports_rolling_upgrade(),
                    }
                })
                .collect(),
        })
    }

    /// Resolves the edge chain and locates every script for every edge
    /// up front: a missing script is a configuration error and must
    /// surface before any statement mutates the database.
    fn resolve(&self, installed: Version, target: Version) -> Result<Vec<ResolvedEdge>, AppError> {
        let path = self.graph.resolve_path(installed, target)?;
        path.into_iter()
            .map(|edge| {
                let step = edge.step();
                let prepare = step
                    .prepare_scripts()
                    .iter()
                    .map(|name| self.locator.locate(name))
                    .collect::<Result<Vec<_>, _>>()?;
                let cleanup = step
                    .cleanup_scripts()
                    .iter()
                    .map(|name| self.locator.locate(name))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ResolvedEdge {
                    edge,
                    prepare,
                    cleanup,
                })
            })
            .collect()
    }

    /// Applies one edge inside a transaction: prepare scripts, data
    /// migration, cleanup scripts. Rolls back on any failure.
    async fn apply_edge(&self, resolved: &ResolvedEdge) -> Result<(), AppError> {
        let txn = self.client.begin().await?;
        match Self::run_edge(&txn, resolved).await {
            Ok(()) => txn.commit().await,
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!("rollback after failed edge also failed: {}", rollback_err);
                }
                Err(err)
            }
        }
    }

    async fn run_edge(txn: &C::Tx<'_>, resolved: &ResolvedEdge) -> Result<(), AppError> {
        for script in &resolved.prepare {
            run_script(txn, script).await?;
        }
        resolved.edge.step().migrate_data(txn).await?;
        for script in &resolved.cleanup {
            run_script(txn, script).await?;
        }
        Ok(())
    }
}
