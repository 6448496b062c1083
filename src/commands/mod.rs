//! CLI command definitions and dispatch.

pub mod health;
pub mod identity;
pub mod migrate;
pub mod session;
pub mod workspace;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use warden_auth::Argon2Hasher;
use warden_cache::{CacheManager, ReadThroughCache};
use warden_core::config::AppConfig;
use warden_core::types::IdentityId;
use warden_database::{DatabasePool, Stores};
use warden_entity::identity::Identity;
use warden_service::Services;

use crate::output::OutputFormat;

/// Warden: multi-tenant identity and session backend
#[derive(Debug, Parser)]
#[command(name = "warden", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file (extension optional)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay loaded from `config/{env}`
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Check database and cache connectivity
    Health,
    /// Identity management
    Identity(identity::IdentityArgs),
    /// Token and session operations
    Session(session::SessionArgs),
    /// Workspace, role and membership management
    Workspace(workspace::WorkspaceArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> anyhow::Result<()> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Health => health::execute(&config).await,
            Commands::Identity(args) => identity::execute(args, &config, self.format).await,
            Commands::Session(args) => session::execute(args, &config, self.format).await,
            Commands::Workspace(args) => workspace::execute(args, &config, self.format).await,
        }
    }
}

/// Open the pool, build the cache and wire every service.
pub async fn connect(config: &AppConfig) -> anyhow::Result<(DatabasePool, Services)> {
    let pool = DatabasePool::connect(&config.database)
        .await
        .context("Failed to open database pool")?;

    let provider = CacheManager::new(&config.cache)
        .await
        .context("Failed to initialize cache")?;
    let cache = ReadThroughCache::new(
        Arc::new(provider),
        Duration::from_secs(config.cache.default_ttl_seconds),
    );

    let services = Services::new(
        Stores::postgres(&pool),
        cache,
        Arc::new(Argon2Hasher::new()),
        &config.auth,
    )
    .context("Failed to wire services")?;

    info!(cache = %config.cache.provider, "Services ready");
    Ok((pool, services))
}

/// Look up an identity by its exact email.
pub async fn identity_by_email(services: &Services, email: &str) -> anyhow::Result<Identity> {
    services
        .identities
        .find_by_email(email)
        .await?
        .with_context(|| format!("No identity registered with email '{email}'"))
}

/// Resolve the acting identity: `--actor` when given, else `fallback`.
pub async fn resolve_actor(
    services: &Services,
    actor: Option<&str>,
    fallback: Option<IdentityId>,
) -> anyhow::Result<IdentityId> {
    match (actor, fallback) {
        (Some(email), _) => Ok(identity_by_email(services, email).await?.id),
        (None, Some(id)) => Ok(id),
        (None, None) => anyhow::bail!("This command requires --actor <email>"),
    }
}

/// Read a secret from the terminal without echo.
pub fn prompt_secret(confirm: bool) -> anyhow::Result<String> {
    let prompt = dialoguer::Password::new().with_prompt("Password");
    let prompt = if confirm {
        prompt.with_confirmation("Repeat password", "Passwords do not match")
    } else {
        prompt
    };
    prompt.interact().context("Failed to read password")
}
