//! Statement-by-statement script execution.

use crate::db::SqlExecutor;
use crate::error::AppError;
use crate::scripts::Script;

/// Executes each statement of `script` in order, stopping at the first
/// failure.
///
/// DDL ordering dependencies make continuing past a failed statement
/// unsafe, and reapplying a partially-applied ALTER/CREATE is not
/// retryable, so there is no retry and no resume within a script.
/// The reported statement index is 1-based.
pub async fn run_script<E>(executor: &E, script: &Script) -> Result<(), AppError>
where
    E: SqlExecutor + ?Sized,
{
    for (idx, statement) in script.statements().iter().enumerate() {
        tracing::debug!(
            script = %script.name(),
            statement = idx + 1,
            total = script.statements().len(),
            "executing statement"
        );
        executor
            .execute(statement)
            .await
            .map_err(|cause| AppError::ScriptExecution {
                script: script.name().to_string(),
                statement: idx + 1,
                source: Box::new(cause),
            })?;
    }
    Ok(())
}
