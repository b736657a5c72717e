//! CLI module for Ladder.
//!
//! Subcommands:
//! - `init`: Record the installed baseline version in the ledger
//! - `upgrade`: Upgrade the database to a target version
//! - `plan`: Show the resolved upgrade path without executing it
//! - `status`: Show the installed version and upgrade history

mod init;
mod plan;
mod status;
mod upgrade;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::db::backends::postgres::PostgresClient;
use crate::error::AppError;
use crate::scripts::ScriptLocator;
use crate::upgrade::{Orchestrator, Precedence, ScriptedStep, SqlLedger, VersionGraph};
use crate::version::Version;

/// Ladder - schema-upgrade orchestrator
#[derive(Parser)]
#[command(name = "ladder")]
#[command(about = "Schema-upgrade orchestrator for the management-plane database")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Record the installed baseline version in the ledger
    Init {
        /// The currently installed schema version
        #[arg(long)]
        version: Version,
    },

    /// Upgrade the database to the target version
    Upgrade {
        /// Version to upgrade to
        #[arg(long)]
        target: Version,

        /// Resolve the path and scripts but execute nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the resolved upgrade path without executing it
    Plan {
        /// Version to plan an upgrade to
        #[arg(long)]
        target: Version,
    },

    /// Show the installed version and upgrade history
    Status,
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Init { version } => self.run_init(version).await,
            Command::Upgrade { target, dry_run } => {
                if dry_run {
                    self.run_plan(target).await
                } else {
                    self.run_upgrade(target).await
                }
            }
            Command::Plan { target } => self.run_plan(target).await,
            Command::Status => self.run_status().await,
        }
    }
}

/// Connects to the management database named in the configuration.
async fn connect(config: &Config) -> Result<PostgresClient, AppError> {
    tracing::info!("connecting to PostgreSQL at {}", config.postgres.uri);
    PostgresClient::connect(&config.postgres.uri).await
}

/// Builds the orchestrator from configuration: connection, script search
/// path, scripted-step registrations, and the SQL ledger.
async fn build_orchestrator(
    config: &Config,
) -> Result<Orchestrator<PostgresClient, SqlLedger<PostgresClient>>, AppError> {
    let client = connect(config).await?;
    let locator = ScriptLocator::new().with_search_paths(config.scripts.paths.clone());

    let mut graph = VersionGraph::new();
    for decl in &config.steps {
        let precedence = if decl.premium {
            Precedence::Override
        } else {
            Precedence::Standard
        };
        graph.register(Arc::new(ScriptedStep::from_config(decl)), precedence)?;
    }

    let ledger = SqlLedger::new(client.clone());
    Ok(Orchestrator::new(client, locator, graph, ledger))
}
