//! The migration ledger: durable record of applied upgrade steps.
//!
//! The ledger is append-only. A baseline entry is written once at initial
//! install; one entry is appended per successfully completed edge and
//! existing entries are never mutated. The latest entry's version is the
//! orchestrator's resume point.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::{DbClient, SqlExecutor};
use crate::error::AppError;
use crate::version::Version;

/// One applied-step record.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub version: Version,
    pub applied_at: DateTime<Utc>,
    pub step_id: String,
}

/// Durable storage for the upgrade history.
#[async_trait]
pub trait MigrationLedger: Send + Sync {
    /// Records the baseline version. A no-op when the ledger already has
    /// entries (re-running init is safe).
    async fn initialize(&self, baseline: Version) -> Result<(), AppError>;

    /// The version of the latest entry, or `None` on a fresh install.
    async fn current_version(&self) -> Result<Option<Version>, AppError>;

    /// Appends an entry for a completed step.
    async fn append(&self, version: Version, step_id: &str) -> Result<(), AppError>;

    /// Full applied history, oldest first.
    async fn history(&self) -> Result<Vec<LedgerEntry>, AppError>;
}

/// Step id recorded for the baseline entry written at initial install.
pub const BASELINE_STEP_ID: &str = "baseline";

const LEDGER_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS upgrade_ledger (
    id BIGSERIAL PRIMARY KEY,
    version TEXT NOT NULL,
    step_id TEXT NOT NULL,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)";

/// SQL-backed ledger over the `upgrade_ledger` table.
pub struct SqlLedger<C> {
    client: C,
}

impl<C: DbClient> SqlLedger<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Creates the ledger table when absent. Runs outside the edge
    /// transactions: the table must exist before the version read.
    async fn ensure_table(&self) -> Result<(), AppError> {
        self.client.execute(LEDGER_TABLE_DDL).await?;
        Ok(())
    }
}

#[async_trait]
impl<C: DbClient> MigrationLedger for SqlLedger<C> {
    async fn initialize(&self, baseline: Version) -> Result<(), AppError> {
        self.ensure_table().await?;
        match self.current_version().await? {
            Some(existing) => {
                tracing::info!(
                    "ledger already initialized at {}, leaving baseline untouched",
                    existing
                );
                Ok(())
            }
            None => {
                self.append(baseline, BASELINE_STEP_ID).await?;
                tracing::info!("ledger initialized at baseline {}", baseline);
                Ok(())
            }
        }
    }

    async fn current_version(&self) -> Result<Option<Version>, AppError> {
        self.ensure_table().await?;
        let rows = self
            .client
            .query("SELECT version FROM upgrade_ledger ORDER BY id DESC LIMIT 1")
            .await?;

        match rows.first() {
            Some(row) => {
                let raw: String = row.get("version")?;
                Ok(Some(raw.parse()?))
            }
            None => Ok(None),
        }
    }

    async fn append(&self, version: Version, step_id: &str) -> Result<(), AppError> {
        let sql = format!(
            "INSERT INTO upgrade_ledger (version, step_id) VALUES ('{}', '{}')",
            version,
            quote_literal(step_id)
        );
        self.client.execute(&sql).await?;
        Ok(())
    }

    async fn history(&self) -> Result<Vec<LedgerEntry>, AppError> {
        self.ensure_table().await?;
        let rows = self
            .client
            .query(
                "SELECT version, step_id, \
                 to_char(applied_at AT TIME ZONE 'UTC', 'YYYY-MM-DD\"T\"HH24:MI:SS.US\"Z\"') \
                 AS applied_at FROM upgrade_ledger ORDER BY id",
            )
            .await?;

        rows.iter()
            .map(|row| {
                let version: String = row.get("version")?;
                let step_id: String = row.get("step_id")?;
                let applied_at: String = row.get("applied_at")?;
                let applied_at = DateTime::parse_from_rfc3339(&applied_at)
                    .map_err(|e| AppError::Db(format!("invalid ledger timestamp: {}", e)))?
                    .with_timezone(&Utc);
                Ok(LedgerEntry {
                    version: version.parse()?,
                    applied_at,
                    step_id,
                })
            })
            .collect()
    }
}

/// Doubles single quotes for safe embedding in a SQL string literal.
fn quote_literal(value: &str) -> String {
    value.replace('\'', "''")
}
