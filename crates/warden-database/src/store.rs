//! Capability traits over the system of record.
//!
//! Services hold these as `Arc<dyn …>` so the PostgreSQL repositories and the
//! in-memory store are interchangeable. Every mutating call takes the acting
//! identity explicitly.

use std::sync::Arc;

use async_trait::async_trait;

use warden_core::result::AppResult;
use warden_core::types::{IdentityId, RoleId, TenantId};
use warden_entity::identity::{Identity, IdentityRemoval, NewIdentity};
use warden_entity::membership::{Membership, NewMembership};
use warden_entity::role::{NewRole, Role, StandingRole};
use warden_entity::tenant::{NewTenant, Tenant, TenantStatus};

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::repositories::{
    IdentityRepository, MembershipRepository, RoleRepository, TenantRepository,
};

/// Identity persistence.
#[async_trait]
pub trait IdentityStore: Send + Sync + std::fmt::Debug + 'static {
    /// Look up an identity by id.
    async fn find_by_id(&self, id: IdentityId) -> AppResult<Option<Identity>>;

    /// Look up an identity by exact email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Identity>>;

    /// Insert an identity; a taken email fails with `AlreadyExists`.
    async fn create(&self, data: &NewIdentity) -> AppResult<Identity>;

    /// Change the display name.
    async fn update_profile(
        &self,
        id: IdentityId,
        display_name: &str,
        actor: IdentityId,
    ) -> AppResult<Identity>;

    /// Change the email; a taken email fails with `AlreadyExists`.
    async fn update_email(&self, id: IdentityId, email: &str, actor: IdentityId)
    -> AppResult<Identity>;

    /// Replace the secret digest.
    async fn update_secret(
        &self,
        id: IdentityId,
        secret_digest: &str,
        actor: IdentityId,
    ) -> AppResult<Identity>;

    /// Record the tenant the identity last worked in.
    async fn set_last_tenant(
        &self,
        id: IdentityId,
        tenant_id: TenantId,
        actor: IdentityId,
    ) -> AppResult<Identity>;

    /// Activate or deactivate the identity.
    async fn set_active(&self, id: IdentityId, active: bool, actor: IdentityId)
    -> AppResult<Identity>;

    /// Delete the identity and its memberships.
    ///
    /// Returns what was removed, or `None` when the identity did not exist.
    async fn delete(&self, id: IdentityId) -> AppResult<Option<IdentityRemoval>>;
}

/// Tenant persistence.
#[async_trait]
pub trait TenantStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a tenant together with the given standing roles in one
    /// transaction.
    async fn create_with_roles(
        &self,
        data: &NewTenant,
        roles: &[StandingRole],
    ) -> AppResult<(Tenant, Vec<Role>)>;

    /// Look up a tenant by id.
    async fn find_by_id(&self, id: TenantId) -> AppResult<Option<Tenant>>;

    /// Rename a tenant.
    async fn rename(&self, id: TenantId, name: &str) -> AppResult<Tenant>;

    /// Change a tenant's lifecycle status.
    async fn set_status(&self, id: TenantId, status: TenantStatus) -> AppResult<Tenant>;
}

/// Role and permission catalog persistence.
#[async_trait]
pub trait RoleStore: Send + Sync + std::fmt::Debug + 'static {
    /// All roles of a tenant, ordered by name.
    async fn find_by_tenant(&self, tenant_id: TenantId) -> AppResult<Vec<Role>>;

    /// Look up a role by id.
    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>>;

    /// Look up a role by its tenant-unique name.
    async fn find_by_name(&self, tenant_id: TenantId, name: &str) -> AppResult<Option<Role>>;

    /// Insert each role whose (tenant, name) is free.
    ///
    /// Returns only the roles that were inserted.
    async fn insert_missing(&self, roles: &[NewRole]) -> AppResult<Vec<Role>>;

    /// Every permission code in the catalog, sorted.
    async fn permission_catalog(&self) -> AppResult<Vec<String>>;
}

/// Membership persistence.
#[async_trait]
pub trait MembershipStore: Send + Sync + std::fmt::Debug + 'static {
    /// Active memberships of an identity in insertion order.
    async fn find_active_by_identity(&self, identity_id: IdentityId)
    -> AppResult<Vec<Membership>>;

    /// The active membership for an (identity, tenant) pair.
    async fn find_active(
        &self,
        identity_id: IdentityId,
        tenant_id: TenantId,
    ) -> AppResult<Option<Membership>>;

    /// Insert an active membership.
    ///
    /// Fails with `AlreadyExists` if the pair already has an active row, even
    /// under concurrent inserts.
    async fn insert_active(&self, data: &NewMembership) -> AppResult<Membership>;

    /// Flip the active membership of a pair to revoked.
    ///
    /// Returns the revoked row, or `None` if there was no active membership.
    async fn revoke(
        &self,
        identity_id: IdentityId,
        tenant_id: TenantId,
        actor: IdentityId,
    ) -> AppResult<Option<Membership>>;
}

/// One handle per store trait, shared by the services.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Identity store.
    pub identities: Arc<dyn IdentityStore>,
    /// Tenant store.
    pub tenants: Arc<dyn TenantStore>,
    /// Role store.
    pub roles: Arc<dyn RoleStore>,
    /// Membership store.
    pub memberships: Arc<dyn MembershipStore>,
}

impl Stores {
    /// Back every store with the same PostgreSQL pool.
    pub fn postgres(pool: &DatabasePool) -> Self {
        let pool = pool.pool().clone();
        Self {
            identities: Arc::new(IdentityRepository::new(pool.clone())),
            tenants: Arc::new(TenantRepository::new(pool.clone())),
            roles: Arc::new(RoleRepository::new(pool.clone())),
            memberships: Arc::new(MembershipRepository::new(pool)),
        }
    }

    /// Back every store with one shared in-memory store.
    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            identities: store.clone(),
            tenants: store.clone(),
            roles: store.clone(),
            memberships: store,
        }
    }
}
