//! The upgrade-step contract.

use futures::future::BoxFuture;

use crate::config::StepConfig;
use crate::db::SqlExecutor;
use crate::error::AppError;
use crate::version::Version;

/// A single versioned unit of migration.
///
/// The orchestrator calls the contract in a fixed order per edge:
/// prepare scripts, [`migrate_data`](UpgradeStep::migrate_data), cleanup
/// scripts, ledger append. Uses `BoxFuture` to stay object-safe so steps
/// can be registered as trait objects.
///
/// `migrate_data` must be safe to run exactly once per ledger entry; the
/// framework does not guarantee idempotence on retry. A step may abort the
/// whole chain with [`AppError::Precondition`] when an operator-fixable
/// precondition is unmet; the message reaches the operator verbatim.
///
/// Steps take `&self` and may be invoked again on a later run, so values
/// computed during a migration (zone-type detection and the like) are
/// threaded through the step's local call graph, never cached on the
/// instance.
pub trait UpgradeStep: Send + Sync {
    /// Stable identifier recorded in the ledger.
    fn id(&self) -> &str;

    /// The installed-version interval this step is valid for:
    /// `(from, to)` where applying the step moves the installation to `to`.
    fn applicable_range(&self) -> (Version, Version);

    /// Ordered script names applied before data migration
    /// (DDL additions the migration logic needs).
    fn prepare_scripts(&self) -> Vec<String> {
        Vec::new()
    }

    /// Performs the step's imperative data transformation.
    fn migrate_data<'a>(
        &'a self,
        executor: &'a dyn SqlExecutor,
    ) -> BoxFuture<'a, Result<(), AppError>>;

    /// Ordered script names applied after successful data migration
    /// (typically DROP of now-obsolete structure).
    fn cleanup_scripts(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether this step may be applied while peer instances still run the
    /// old schema version. Informational: surfaced in plans and logs, not
    /// enforced.
    fn supports_rolling_upgrade(&self) -> bool {
        false
    }
}

/// An upgrade step declared entirely in configuration: prepare and cleanup
/// scripts with no imperative data migration.
#[derive(Debug, Clone)]
pub struct ScriptedStep {
    id: String,
    from: Version,
    to: Version,
    prepare: Vec<String>,
    cleanup: Vec<String>,
    rolling: bool,
}

impl ScriptedStep {
    pub fn new(
        id: impl Into<String>,
        from: Version,
        to: Version,
        prepare: Vec<String>,
        cleanup: Vec<String>,
        rolling: bool,
    ) -> Self {
        Self {
            id: id.into(),
            from,
            to,
            prepare,
            cleanup,
            rolling,
        }
    }

    /// Builds a scripted step from a `[[steps]]` config entry.
    pub fn from_config(decl: &StepConfig) -> Self {
        let id = decl
            .id
            .clone()
            .unwrap_or_else(|| format!("{}-to-{}", decl.from, decl.to));
        Self::new(
            id,
            decl.from,
            decl.to,
            decl.prepare.clone(),
            decl.cleanup.clone(),
            decl.rolling,
        )
    }
}

impl UpgradeStep for ScriptedStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn applicable_range(&self) -> (Version, Version) {
        (self.from, self.to)
    }

    fn prepare_scripts(&self) -> Vec<String> {
        self.prepare.clone()
    }

    fn migrate_data<'a>(
        &'a self,
        _executor: &'a dyn SqlExecutor,
    ) -> BoxFuture<'a, Result<(), AppError>> {
        Box::pin(std::future::ready(Ok(())))
    }

    fn cleanup_scripts(&self) -> Vec<String> {
        self.cleanup.clone()
    }

    fn supports_rolling_upgrade(&self) -> bool {
        self.rolling
    }
}
