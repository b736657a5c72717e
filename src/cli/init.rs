//! Init command handler.

use color_eyre::Result;

use crate::config::Config;
use crate::upgrade::{MigrationLedger, SqlLedger};
use crate::version::Version;

use super::{connect, App};

impl App {
    /// Run the init command: ensure the ledger table exists and record
    /// the installed baseline version.
    pub async fn run_init(&self, version: Version) -> Result<()> {
        let config = Config::load()?;
        let client = connect(&config).await?;

        let ledger = SqlLedger::new(client);
        ledger.initialize(version).await?;

        if let Some(current) = ledger.current_version().await? {
            tracing::info!("ledger ready, installed version: {}", current);
        }
        Ok(())
    }
}
