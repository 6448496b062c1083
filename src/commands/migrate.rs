//! Database migration management commands.

use anyhow::Context;
use clap::{Args, Subcommand};

use warden_core::config::AppConfig;
use warden_database::DatabasePool;
use warden_database::migration::run_migrations;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Check database connectivity
    Check,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> anyhow::Result<()> {
    let pool = DatabasePool::connect(&config.database)
        .await
        .context("Failed to open database pool")?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            run_migrations(pool.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Check => {
            pool.health_check().await?;
            output::print_success("Database is reachable.");
        }
    }

    pool.close().await;
    Ok(())
}
