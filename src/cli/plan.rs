//! Plan command handler (also backs `upgrade --dry-run`).

use color_eyre::Result;

use crate::config::Config;
use crate::version::Version;

use super::{build_orchestrator, App};

impl App {
    /// Resolve and print the upgrade path without executing anything.
    pub async fn run_plan(&self, target: Version) -> Result<()> {
        let config = Config::load()?;
        let orchestrator = build_orchestrator(&config).await?;

        let plan = orchestrator.plan(target).await?;

        if plan.edges.is_empty() {
            println!(
                "Already at {}; an upgrade to {} has nothing to do.",
                plan.installed, plan.target
            );
            return Ok(());
        }

        println!("Upgrade plan: {} -> {}", plan.installed, plan.target);
        for edge in &plan.edges {
            println!(
                "  {} -> {}  [{}]  {} statement(s){}",
                edge.from,
                edge.to,
                edge.step_id,
                edge.statements,
                if edge.rolling {
                    ""
                } else {
                    "  (requires peers stopped)"
                }
            );
            for name in &edge.prepare {
                println!("      prepare: {}", name);
            }
            for name in &edge.cleanup {
                println!("      cleanup: {}", name);
            }
        }

        Ok(())
    }
}
