//! Backend connectivity check.

use anyhow::Context;
use tracing::warn;

use warden_cache::CacheManager;
use warden_core::config::AppConfig;
use warden_core::traits::cache::CacheProvider;
use warden_database::DatabasePool;

use crate::output;

/// Check that the database and the configured cache both answer.
pub async fn execute(config: &AppConfig) -> anyhow::Result<()> {
    let pool = DatabasePool::connect(&config.database)
        .await
        .context("Failed to open database pool")?;
    let database = pool.health_check().await;
    pool.close().await;

    let cache = match CacheManager::new(&config.cache).await {
        Ok(manager) => manager.health_check().await,
        Err(e) => Err(e),
    };

    output::print_kv("database", &status(&database));
    output::print_kv(
        &format!("cache ({})", config.cache.provider),
        &status(&cache),
    );

    match (database, cache) {
        (Ok(true), Ok(true)) => {
            output::print_success("All backends are reachable.");
            Ok(())
        }
        (database, cache) => {
            warn!(database = %status(&database), cache = %status(&cache), "Backend check failed");
            anyhow::bail!("One or more backends are unavailable")
        }
    }
}

fn status(result: &Result<bool, warden_core::error::AppError>) -> String {
    match result {
        Ok(true) => "ok".to_string(),
        Ok(false) => "unhealthy".to_string(),
        Err(e) => format!("error: {e}"),
    }
}
