//! Core traits for database access.
//!
//! This module defines the trait hierarchy that backends must implement:
//!
//! - [`SqlExecutor`] - Statement execution and queries
//! - [`Transaction`] - Transaction lifecycle management
//! - [`DbClient`] - Connection pool and transaction creation
//!
//! The orchestrator is generic over [`DbClient`]; upgrade steps receive a
//! `&dyn SqlExecutor` so their data-migration bodies stay decoupled from
//! the concrete backend.

use async_trait::async_trait;

use crate::db::row::Row;
use crate::error::AppError;

/// Executes SQL statements against the database.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Executes a single SQL statement without returning rows.
    ///
    /// Use this for DDL (CREATE, ALTER, DROP) and DML mutations.
    /// Returns the number of rows affected (0 for DDL).
    async fn execute(&self, sql: &str) -> Result<u64, AppError>;

    /// Executes a SQL query and returns the result rows.
    async fn query(&self, sql: &str) -> Result<Vec<Row>, AppError>;
}

/// Transaction lifecycle management.
///
/// This trait handles committing or rolling back a transaction.
/// It's separate from [`SqlExecutor`] to allow flexibility in how
/// transactions are composed.
#[async_trait]
pub trait Transaction: Send + Sync {
    /// Commits the transaction, making all changes permanent.
    ///
    /// Consumes the transaction - it cannot be used after commit.
    async fn commit(self) -> Result<(), AppError>;

    /// Rolls back the transaction, discarding all changes.
    ///
    /// Consumes the transaction - it cannot be used after rollback.
    async fn rollback(self) -> Result<(), AppError>;
}

/// A database client that can begin transactions.
///
/// Implementations typically wrap a connection pool and provide
/// auto-commit statements via the executor methods, plus explicit
/// transactions via [`begin`](DbClient::begin).
#[async_trait]
pub trait DbClient: SqlExecutor {
    /// The transaction type returned by this client.
    type Tx<'a>: Transaction + SqlExecutor
    where
        Self: 'a;

    /// Begins a new transaction.
    ///
    /// The returned transaction can be used to execute statements,
    /// then must be either committed or rolled back.
    async fn begin(&self) -> Result<Self::Tx<'_>, AppError>;
}
