//! Redis connection and key namespace.

use redis::Client;
use redis::aio::ConnectionManager;
use tracing::info;

use warden_core::config::cache::RedisCacheConfig;
use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;

/// Reconnecting Redis connection bound to one key namespace.
///
/// Every key handed to Redis goes through [`RedisClient::namespaced`], so
/// several deployments can share an instance.
#[derive(Debug, Clone)]
pub struct RedisClient {
    conn: ConnectionManager,
    namespace: String,
}

impl RedisClient {
    /// Open a managed connection to `config.url`.
    pub async fn connect(config: &RedisCacheConfig) -> AppResult<Self> {
        let client = Client::open(config.url.as_str()).map_err(|e| {
            AppError::with_source(ErrorKind::Cache, "Invalid Redis URL", e)
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            AppError::with_source(ErrorKind::Cache, "Failed to connect to Redis", e)
        })?;

        info!(namespace = %config.key_prefix, "Connected to Redis");
        Ok(Self {
            conn,
            namespace: config.key_prefix.clone(),
        })
    }

    /// Handle for issuing commands. Clones share the underlying connection.
    pub fn conn(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// `key` inside this client's namespace.
    pub fn namespaced(&self, key: &str) -> String {
        format!("{}{key}", self.namespace)
    }

    /// Send `PING` and report whether Redis answered `PONG`.
    pub async fn ping(&self) -> Result<bool, redis::RedisError> {
        let mut conn = self.conn();
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(reply == "PONG")
    }
}
