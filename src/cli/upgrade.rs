//! Upgrade command handler.

use color_eyre::Result;

use crate::config::Config;
use crate::version::Version;

use super::{build_orchestrator, App};

impl App {
    /// Run the upgrade command: resolve the chain from the ledger's
    /// recorded version to `target` and apply it.
    pub async fn run_upgrade(&self, target: Version) -> Result<()> {
        let config = Config::load()?;
        let orchestrator = build_orchestrator(&config).await?;

        let report = orchestrator.upgrade(target).await?;

        if report.applied.is_empty() {
            tracing::info!(
                "database already at {}, no upgrade steps needed",
                report.current_version
            );
        } else {
            for edge in &report.applied {
                tracing::info!("applied {} ({} -> {})", edge.step_id, edge.from, edge.to);
            }
            tracing::info!(
                "upgrade complete: {} -> {}",
                report.previous_version,
                report.current_version
            );
        }

        Ok(())
    }
}
