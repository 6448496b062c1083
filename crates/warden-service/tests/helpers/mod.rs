//! Shared test helpers for service integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use warden_cache::ReadThroughCache;
use warden_cache::memory::MemoryCacheProvider;
use warden_core::config::AuthConfig;
use warden_core::config::cache::MemoryCacheConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::SecretHasher;
use warden_database::{MemoryStore, Stores};
use warden_service::{AuthSession, Services, SignupRequest};

pub const SECRET: &str = "Quartz-Lantern-91-Velvet";

/// Reversible hasher so tests don't pay for Argon2.
#[derive(Debug, Default)]
pub struct PlainHasher;

impl SecretHasher for PlainHasher {
    fn hash(&self, plain: &str) -> AppResult<String> {
        Ok(format!("plain:{plain}"))
    }

    fn matches(&self, plain: &str, digest: &str) -> AppResult<bool> {
        digest
            .strip_prefix("plain:")
            .map(|stored| stored == plain)
            .ok_or_else(|| AppError::internal("not a plain digest"))
    }
}

/// Test application context
pub struct TestApp {
    /// Wired services
    pub services: Services,
    /// Backing store, for direct inspection
    pub store: MemoryStore,
    /// Cache provider behind the services, for direct inspection
    pub cache: Arc<MemoryCacheProvider>,
}

impl TestApp {
    /// Create a new application over an empty in-memory store with the
    /// default credential policy
    pub fn new() -> Self {
        Self::with_auth(AuthConfig::default())
    }

    /// Create a new application with a custom auth policy
    pub fn with_auth(auth: AuthConfig) -> Self {
        let store = MemoryStore::new();
        let provider = Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig::default()));
        let cache = ReadThroughCache::new(provider.clone(), Duration::from_secs(300));
        let auth = AuthConfig {
            jwt_secret: "integration-test-secret".to_string(),
            ..auth
        };

        let services = Services::new(
            Stores::memory(store.clone()),
            cache,
            Arc::new(PlainHasher),
            &auth,
        )
        .expect("Failed to wire services");

        Self {
            services,
            store,
            cache: provider,
        }
    }

    /// Sign up an identity with the shared test secret
    pub async fn signup(&self, email: &str, name: &str) -> AuthSession {
        self.services
            .sessions
            .signup(SignupRequest {
                email: email.to_string(),
                secret: SECRET.to_string(),
                name: name.to_string(),
            })
            .await
            .expect("signup should succeed")
    }
}
