//! Membership resolver.
//!
//! Reads never return a revoked membership. The active list is in insertion
//! order with the identity's last-used tenant moved to the front; its first
//! entry is the identity's primary tenant.

use std::sync::Arc;

use tracing::{info, warn};

use warden_cache::ReadThroughCache;
use warden_cache::keys;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::{IdentityId, RoleId, TenantId};
use warden_database::MembershipStore;
use warden_entity::membership::{Membership, NewMembership};

use crate::identity::IdentityService;

/// Resolves and maintains identity ↔ tenant memberships.
#[derive(Debug, Clone)]
pub struct MembershipResolver {
    store: Arc<dyn MembershipStore>,
    identities: Arc<IdentityService>,
    cache: ReadThroughCache,
}

impl MembershipResolver {
    /// Create a new resolver.
    pub fn new(
        store: Arc<dyn MembershipStore>,
        identities: Arc<IdentityService>,
        cache: ReadThroughCache,
    ) -> Self {
        Self {
            store,
            identities,
            cache,
        }
    }

    /// Active memberships of an identity, primary first.
    pub async fn active_memberships_of(&self, identity_id: IdentityId) -> AppResult<Vec<Membership>> {
        let store = &self.store;
        let cached = self
            .cache
            .get_or_load(&keys::memberships_by_user(identity_id), move || async move {
                let rows = store.find_active_by_identity(identity_id).await?;
                Ok((!rows.is_empty()).then_some(rows))
            })
            .await?;

        let mut memberships: Vec<Membership> = cached
            .unwrap_or_default()
            .into_iter()
            .filter(Membership::is_active)
            .collect();
        memberships.sort_by_key(|m| m.seq);

        let last_tenant = self
            .identities
            .find_by_id(identity_id)
            .await?
            .and_then(|identity| identity.last_tenant_id);
        if let Some(tenant_id) = last_tenant {
            if let Some(pos) = memberships.iter().position(|m| m.tenant_id == tenant_id) {
                let preferred = memberships.remove(pos);
                memberships.insert(0, preferred);
            }
        }

        Ok(memberships)
    }

    /// The active membership for an (identity, tenant) pair.
    pub async fn membership_of(
        &self,
        identity_id: IdentityId,
        tenant_id: TenantId,
    ) -> AppResult<Membership> {
        self.cache
            .get_or_load(&keys::membership(identity_id, tenant_id), || {
                self.store.find_active(identity_id, tenant_id)
            })
            .await?
            .filter(Membership::is_active)
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "No active membership for identity {identity_id} in tenant {tenant_id}"
                ))
            })
    }

    /// Make an identity an active member of a tenant with the given role.
    ///
    /// Fails with `AlreadyExists` if an active membership already exists.
    pub async fn add_membership(
        &self,
        actor: IdentityId,
        identity_id: IdentityId,
        tenant_id: TenantId,
        role_id: RoleId,
    ) -> AppResult<Membership> {
        let membership = self
            .store
            .insert_active(&NewMembership {
                identity_id,
                tenant_id,
                role_id,
                created_by: actor,
            })
            .await?;

        self.cache
            .invalidate(&keys::memberships_by_user(identity_id))
            .await?;
        let pair_key = keys::membership(identity_id, tenant_id);
        if let Err(e) = self.cache.put(&pair_key, &membership).await {
            warn!(key = %pair_key, error = %e, "Failed to seed membership cache");
        }

        info!(
            %identity_id,
            %tenant_id,
            %role_id,
            actor = %actor,
            "Membership added"
        );
        Ok(membership)
    }

    /// Revoke the active membership of a pair.
    pub async fn revoke_membership(
        &self,
        actor: IdentityId,
        identity_id: IdentityId,
        tenant_id: TenantId,
    ) -> AppResult<Membership> {
        let revoked = self
            .store
            .revoke(identity_id, tenant_id, actor)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "No active membership for identity {identity_id} in tenant {tenant_id}"
                ))
            })?;

        self.cache
            .invalidate_all(&[
                keys::memberships_by_user(identity_id),
                keys::membership(identity_id, tenant_id),
            ])
            .await?;

        info!(%identity_id, %tenant_id, actor = %actor, "Membership revoked");
        Ok(revoked)
    }

    /// Drop every cached membership entry of an identity.
    pub async fn evict(&self, identity_id: IdentityId) -> AppResult<()> {
        let mut stale = vec![keys::memberships_by_user(identity_id)];
        stale.extend(
            self.store
                .find_active_by_identity(identity_id)
                .await?
                .iter()
                .map(|m| keys::membership(identity_id, m.tenant_id)),
        );
        self.cache.invalidate_all(&stale).await
    }
}
