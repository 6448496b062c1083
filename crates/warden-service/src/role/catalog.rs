//! Role/permission catalog.
//!
//! Roles are read fresh from the store on every call; only identities and
//! memberships are cached.
//!
//! New tenants get their standing roles from `TenantStore::create_with_roles`,
//! inside the transaction that creates the tenant, so a tenant never exists
//! without them. [`RoleCatalog::create_default_roles`] is the repair path for
//! tenants created before a standing role was added. Both paths insert
//! through the store's insert-if-absent helper.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::TenantId;
use warden_database::RoleStore;
use warden_entity::membership::Membership;
use warden_entity::role::{NewRole, Role, StandingRole};

/// Tenant roles and the permission codes they grant.
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    store: Arc<dyn RoleStore>,
}

impl RoleCatalog {
    /// Create a new catalog.
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }

    /// Ensure an existing tenant has every standing role.
    ///
    /// Idempotent: only missing roles are inserted, and concurrent callers
    /// are resolved by the store's insert-if-absent. Returns the roles
    /// inserted by this call.
    pub async fn create_default_roles(&self, tenant_id: TenantId) -> AppResult<Vec<Role>> {
        let existing: BTreeSet<String> = self
            .store
            .find_by_tenant(tenant_id)
            .await?
            .into_iter()
            .map(|r| r.name)
            .collect();

        let missing: Vec<NewRole> = StandingRole::ALL
            .iter()
            .filter(|standing| !existing.contains(standing.name()))
            .map(|standing| standing.new_role(tenant_id))
            .collect();
        if missing.is_empty() {
            return Ok(Vec::new());
        }

        let inserted = self.store.insert_missing(&missing).await?;
        if !inserted.is_empty() {
            info!(
                %tenant_id,
                roles = ?inserted.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
                "Standing roles created"
            );
        }
        Ok(inserted)
    }

    /// Permission codes granted by `role`.
    pub fn permissions_of(&self, role: &Role) -> BTreeSet<String> {
        role.permissions.iter().cloned().collect()
    }

    /// A tenant's standing role of the given kind.
    pub async fn standing_role(&self, tenant_id: TenantId, kind: StandingRole) -> AppResult<Role> {
        self.store
            .find_by_name(tenant_id, kind.name())
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Tenant {tenant_id} has no '{kind}' role"))
            })
    }

    /// The role a membership holds.
    pub async fn role_of(&self, membership: &Membership) -> AppResult<Role> {
        self.store
            .find_by_id(membership.role_id)
            .await?
            .filter(|role| role.tenant_id == membership.tenant_id)
            .ok_or_else(|| AppError::not_found(format!("Role {} not found", membership.role_id)))
    }

    /// All roles of a tenant, ordered by name.
    pub async fn roles_of(&self, tenant_id: TenantId) -> AppResult<Vec<Role>> {
        self.store.find_by_tenant(tenant_id).await
    }

    /// Every permission code in the catalog.
    pub async fn permission_catalog(&self) -> AppResult<Vec<String>> {
        self.store.permission_catalog().await
    }
}
