//! Identity service.
//!
//! | Mutation | Keys invalidated |
//! |---|---|
//! | create | email (then id + email seeded) |
//! | profile / secret / active flag / last tenant | id + email |
//! | email change | id + old email + new email |
//! | delete | id + email + membership list + every pair key |

use std::sync::Arc;

use tracing::{info, warn};
use validator::ValidateEmail;

use warden_cache::ReadThroughCache;
use warden_cache::keys;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::{IdentityId, TenantId};
use warden_database::IdentityStore;
use warden_entity::identity::{Identity, NewIdentity};

/// Cached access to identities.
#[derive(Debug, Clone)]
pub struct IdentityService {
    store: Arc<dyn IdentityStore>,
    cache: ReadThroughCache,
}

impl IdentityService {
    /// Create a new identity service.
    pub fn new(store: Arc<dyn IdentityStore>, cache: ReadThroughCache) -> Self {
        Self { store, cache }
    }

    /// Find an identity by id.
    pub async fn find_by_id(&self, id: IdentityId) -> AppResult<Option<Identity>> {
        self.cache
            .get_or_load(&keys::identity_by_id(id), || self.store.find_by_id(id))
            .await
    }

    /// Find an identity by exact email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Identity>> {
        self.cache
            .get_or_load(&keys::identity_by_email(email), || {
                self.store.find_by_email(email)
            })
            .await
    }

    /// Get an identity by id or fail with `NotFound`.
    pub async fn get(&self, id: IdentityId) -> AppResult<Identity> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Identity {id} not found")))
    }

    /// Register a new identity.
    ///
    /// Email uniqueness is checked against the store, never the cache.
    pub async fn create(&self, data: NewIdentity) -> AppResult<Identity> {
        if self.store.find_by_email(&data.email).await?.is_some() {
            return Err(AppError::already_exists(format!(
                "Email '{}' is already registered",
                data.email
            )));
        }

        let identity = self.store.create(&data).await?;
        self.cache
            .invalidate(&keys::identity_by_email(&identity.email))
            .await?;
        self.seed(&identity).await;

        info!(identity_id = %identity.id, "Identity created");
        Ok(identity)
    }

    /// Change the display name.
    pub async fn update_profile(
        &self,
        actor: IdentityId,
        id: IdentityId,
        display_name: &str,
    ) -> AppResult<Identity> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(AppError::validation("Display name cannot be empty"));
        }

        let identity = self.store.update_profile(id, display_name, actor).await?;
        self.invalidate_identity(&identity).await?;
        info!(identity_id = %id, actor = %actor, "Profile updated");
        Ok(identity)
    }

    /// Change the email, invalidating both the old and the new email key.
    pub async fn update_email(
        &self,
        actor: IdentityId,
        id: IdentityId,
        new_email: &str,
    ) -> AppResult<Identity> {
        if !new_email.validate_email() {
            return Err(AppError::validation("Invalid email format"));
        }

        let current = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Identity {id} not found")))?;
        if current.email == new_email {
            return Ok(current);
        }
        if self.store.find_by_email(new_email).await?.is_some() {
            return Err(AppError::already_exists(format!(
                "Email '{new_email}' is already registered"
            )));
        }

        let updated = self.store.update_email(id, new_email, actor).await?;
        self.cache
            .invalidate_all(&[
                keys::identity_by_id(id),
                keys::identity_by_email(&current.email),
                keys::identity_by_email(&updated.email),
            ])
            .await?;

        info!(identity_id = %id, actor = %actor, "Email changed");
        Ok(updated)
    }

    /// Replace the secret digest.
    pub async fn update_secret(
        &self,
        actor: IdentityId,
        id: IdentityId,
        secret_digest: &str,
    ) -> AppResult<Identity> {
        let identity = self.store.update_secret(id, secret_digest, actor).await?;
        self.invalidate_identity(&identity).await?;
        info!(identity_id = %id, actor = %actor, "Secret replaced");
        Ok(identity)
    }

    /// Activate or deactivate an identity.
    pub async fn set_active(
        &self,
        actor: IdentityId,
        id: IdentityId,
        active: bool,
    ) -> AppResult<Identity> {
        let identity = self.store.set_active(id, active, actor).await?;
        self.invalidate_identity(&identity).await?;
        info!(identity_id = %id, actor = %actor, active, "Identity active flag changed");
        Ok(identity)
    }

    /// Record the tenant the identity last worked in.
    pub async fn set_last_tenant(
        &self,
        actor: IdentityId,
        id: IdentityId,
        tenant_id: TenantId,
    ) -> AppResult<Identity> {
        let identity = self.store.set_last_tenant(id, tenant_id, actor).await?;
        self.invalidate_identity(&identity).await?;
        Ok(identity)
    }

    /// Delete an identity together with its memberships.
    ///
    /// Returns `false` if it did not exist.
    pub async fn delete(&self, actor: IdentityId, id: IdentityId) -> AppResult<bool> {
        let Some(removal) = self.store.delete(id).await? else {
            return Ok(false);
        };

        let mut stale = vec![
            keys::identity_by_id(id),
            keys::identity_by_email(&removal.identity.email),
            keys::memberships_by_user(id),
        ];
        stale.extend(
            removal
                .memberships
                .iter()
                .map(|m| keys::membership(id, m.tenant_id)),
        );
        self.cache.invalidate_all(&stale).await?;

        info!(
            identity_id = %id,
            actor = %actor,
            memberships = removal.memberships.len(),
            "Identity deleted"
        );
        Ok(true)
    }

    /// Drop the cached id and email entries of an identity.
    pub async fn evict(&self, id: IdentityId) -> AppResult<()> {
        match self.store.find_by_id(id).await? {
            Some(identity) => self.invalidate_identity(&identity).await,
            None => self.cache.invalidate(&keys::identity_by_id(id)).await,
        }
    }

    async fn invalidate_identity(&self, identity: &Identity) -> AppResult<()> {
        self.cache
            .invalidate_all(&[
                keys::identity_by_id(identity.id),
                keys::identity_by_email(&identity.email),
            ])
            .await
    }

    async fn seed(&self, identity: &Identity) {
        for key in [
            keys::identity_by_id(identity.id),
            keys::identity_by_email(&identity.email),
        ] {
            if let Err(e) = self.cache.put(&key, identity).await {
                warn!(key = %key, error = %e, "Failed to seed identity cache");
            }
        }
    }
}
