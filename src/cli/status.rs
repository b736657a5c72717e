//! Status command handler.

use color_eyre::Result;

use crate::config::Config;
use crate::upgrade::{MigrationLedger, SqlLedger};

use super::{connect, App};

impl App {
    /// Print the installed version and the applied-step history.
    pub async fn run_status(&self) -> Result<()> {
        let config = Config::load()?;
        let client = connect(&config).await?;
        let ledger = SqlLedger::new(client);

        match ledger.current_version().await? {
            None => println!("Ledger is empty; run `ladder init --version <installed>` first."),
            Some(current) => {
                println!("Installed version: {}", current);
                println!("History:");
                for entry in ledger.history().await? {
                    println!(
                        "  {}  {}  [{}]",
                        entry.applied_at.format("%Y-%m-%d %H:%M:%S"),
                        entry.version,
                        entry.step_id
                    );
                }
            }
        }

        Ok(())
    }
}
