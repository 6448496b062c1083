//! Mutex-guarded in-memory store.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::{IdentityId, MembershipId, RoleId, TenantId};
use warden_entity::identity::{Identity, IdentityRemoval, NewIdentity};
use warden_entity::membership::{Membership, MembershipStatus, NewMembership};
use warden_entity::role::{NewRole, Role, StandingRole};
use warden_entity::tenant::{NewTenant, Tenant, TenantStatus};

use super::state::State;
use crate::store::{IdentityStore, MembershipStore, RoleStore, TenantStore};

/// In-memory system of record.
///
/// Cloning shares the underlying tables. Uniqueness rules match the
/// PostgreSQL schema: unique email, unique (tenant, role name), and at most
/// one active membership per (identity, tenant).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Create an empty store with the permission catalog seeded.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| AppError::internal("In-memory store lock poisoned"))
    }

    /// Apply `change` to an identity and return the updated row.
    fn modify_identity(
        &self,
        id: IdentityId,
        actor: IdentityId,
        change: impl FnOnce(&mut Identity),
    ) -> AppResult<Identity> {
        let mut state = self.lock()?;
        let identity = state
            .identities
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Identity {id} not found")))?;
        change(identity);
        identity.updated_by = Some(actor);
        identity.updated_at = Utc::now();
        Ok(identity.clone())
    }

    fn modify_tenant(&self, id: TenantId, change: impl FnOnce(&mut Tenant)) -> AppResult<Tenant> {
        let mut state = self.lock()?;
        let tenant = state
            .tenants
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Tenant {id} not found")))?;
        change(tenant);
        tenant.updated_at = Utc::now();
        Ok(tenant.clone())
    }
}

fn insert_role(state: &mut State, data: &NewRole) -> Option<Role> {
    let taken = state
        .roles
        .values()
        .any(|r| r.tenant_id == data.tenant_id && r.name == data.name);
    if taken {
        return None;
    }

    let mut permissions = data.permissions.clone();
    permissions.sort();
    permissions.dedup();

    let role = Role {
        id: RoleId::new(),
        tenant_id: data.tenant_id,
        name: data.name.clone(),
        description: data.description.clone(),
        system: data.system,
        permissions,
        created_at: Utc::now(),
    };
    state.roles.insert(role.id, role.clone());
    Some(role)
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_by_id(&self, id: IdentityId) -> AppResult<Option<Identity>> {
        Ok(self.lock()?.identities.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Identity>> {
        Ok(self
            .lock()?
            .identities
            .values()
            .find(|i| i.email == email)
            .cloned())
    }

    async fn create(&self, data: &NewIdentity) -> AppResult<Identity> {
        let mut state = self.lock()?;
        if state.email_taken(&data.email, None) {
            return Err(AppError::already_exists(format!(
                "Email '{}' is already registered",
                data.email
            )));
        }

        let now = Utc::now();
        let identity = Identity {
            id: IdentityId::new(),
            email: data.email.clone(),
            secret_digest: data.secret_digest.clone(),
            display_name: data.display_name.clone(),
            active: true,
            last_tenant_id: None,
            created_at: now,
            updated_at: now,
            updated_by: None,
        };
        state.identities.insert(identity.id, identity.clone());
        debug!(identity_id = %identity.id, "Identity inserted into memory store");
        Ok(identity)
    }

    async fn update_profile(
        &self,
        id: IdentityId,
        display_name: &str,
        actor: IdentityId,
    ) -> AppResult<Identity> {
        self.modify_identity(id, actor, |i| i.display_name = display_name.to_string())
    }

    async fn update_email(
        &self,
        id: IdentityId,
        email: &str,
        actor: IdentityId,
    ) -> AppResult<Identity> {
        let mut state = self.lock()?;
        if state.email_taken(email, Some(id)) {
            return Err(AppError::already_exists(format!(
                "Email '{email}' is already registered"
            )));
        }
        let identity = state
            .identities
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Identity {id} not found")))?;
        identity.email = email.to_string();
        identity.updated_by = Some(actor);
        identity.updated_at = Utc::now();
        Ok(identity.clone())
    }

    async fn update_secret(
        &self,
        id: IdentityId,
        secret_digest: &str,
        actor: IdentityId,
    ) -> AppResult<Identity> {
        self.modify_identity(id, actor, |i| i.secret_digest = secret_digest.to_string())
    }

    async fn set_last_tenant(
        &self,
        id: IdentityId,
        tenant_id: TenantId,
        actor: IdentityId,
    ) -> AppResult<Identity> {
        self.modify_identity(id, actor, |i| i.last_tenant_id = Some(tenant_id))
    }

    async fn set_active(
        &self,
        id: IdentityId,
        active: bool,
        actor: IdentityId,
    ) -> AppResult<Identity> {
        self.modify_identity(id, actor, |i| i.active = active)
    }

    async fn delete(&self, id: IdentityId) -> AppResult<Option<IdentityRemoval>> {
        let mut state = self.lock()?;
        let Some(identity) = state.identities.remove(&id) else {
            return Ok(None);
        };

        let removed: Vec<MembershipId> = state
            .memberships
            .values()
            .filter(|m| m.identity_id == id)
            .map(|m| m.id)
            .collect();
        let mut memberships: Vec<Membership> = removed
            .iter()
            .filter_map(|mid| state.memberships.remove(mid))
            .collect();
        memberships.sort_by_key(|m| m.seq);

        Ok(Some(IdentityRemoval {
            identity,
            memberships,
        }))
    }
}

#[async_trait]
impl TenantStore for MemoryStore {
    async fn create_with_roles(
        &self,
        data: &NewTenant,
        roles: &[StandingRole],
    ) -> AppResult<(Tenant, Vec<Role>)> {
        let mut state = self.lock()?;
        let now = Utc::now();
        let tenant = Tenant {
            id: TenantId::new(),
            name: data.name.clone(),
            status: TenantStatus::Active,
            plan: data.plan,
            trial_ends_at: None,
            created_at: now,
            updated_at: now,
            created_by: data.created_by,
        };
        state.tenants.insert(tenant.id, tenant.clone());

        let created = roles
            .iter()
            .filter_map(|standing| insert_role(&mut state, &standing.new_role(tenant.id)))
            .collect();
        Ok((tenant, created))
    }

    async fn find_by_id(&self, id: TenantId) -> AppResult<Option<Tenant>> {
        Ok(self.lock()?.tenants.get(&id).cloned())
    }

    async fn rename(&self, id: TenantId, name: &str) -> AppResult<Tenant> {
        self.modify_tenant(id, |t| t.name = name.to_string())
    }

    async fn set_status(&self, id: TenantId, status: TenantStatus) -> AppResult<Tenant> {
        self.modify_tenant(id, |t| t.status = status)
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn find_by_tenant(&self, tenant_id: TenantId) -> AppResult<Vec<Role>> {
        let mut roles: Vec<Role> = self
            .lock()?
            .roles
            .values()
            .filter(|r| r.tenant_id == tenant_id)
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.lock()?.roles.get(&id).cloned())
    }

    async fn find_by_name(&self, tenant_id: TenantId, name: &str) -> AppResult<Option<Role>> {
        Ok(self
            .lock()?
            .roles
            .values()
            .find(|r| r.tenant_id == tenant_id && r.name == name)
            .cloned())
    }

    async fn insert_missing(&self, roles: &[NewRole]) -> AppResult<Vec<Role>> {
        let mut state = self.lock()?;
        Ok(roles
            .iter()
            .filter_map(|data| insert_role(&mut state, data))
            .collect())
    }

    async fn permission_catalog(&self) -> AppResult<Vec<String>> {
        Ok(self.lock()?.permissions.clone())
    }
}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn find_active_by_identity(
        &self,
        identity_id: IdentityId,
    ) -> AppResult<Vec<Membership>> {
        let mut memberships: Vec<Membership> = self
            .lock()?
            .memberships
            .values()
            .filter(|m| m.identity_id == identity_id && m.is_active())
            .cloned()
            .collect();
        memberships.sort_by_key(|m| m.seq);
        Ok(memberships)
    }

    async fn find_active(
        &self,
        identity_id: IdentityId,
        tenant_id: TenantId,
    ) -> AppResult<Option<Membership>> {
        Ok(self
            .lock()?
            .active_membership(identity_id, tenant_id)
            .cloned())
    }

    async fn insert_active(&self, data: &NewMembership) -> AppResult<Membership> {
        let mut state = self.lock()?;

        if !state.identities.contains_key(&data.identity_id) {
            return Err(AppError::not_found(format!(
                "Identity {} not found",
                data.identity_id
            )));
        }
        let role_in_tenant = state
            .roles
            .get(&data.role_id)
            .is_some_and(|r| r.tenant_id == data.tenant_id);
        if !role_in_tenant {
            return Err(AppError::validation(format!(
                "Role {} does not belong to tenant {}",
                data.role_id, data.tenant_id
            )));
        }
        if state
            .active_membership(data.identity_id, data.tenant_id)
            .is_some()
        {
            return Err(AppError::already_exists(format!(
                "Identity {} is already a member of tenant {}",
                data.identity_id, data.tenant_id
            )));
        }

        let membership = Membership {
            id: MembershipId::new(),
            identity_id: data.identity_id,
            tenant_id: data.tenant_id,
            role_id: data.role_id,
            status: MembershipStatus::Active,
            seq: state.next_seq(),
            joined_at: Utc::now(),
            revoked_at: None,
            updated_by: Some(data.created_by),
        };
        state.memberships.insert(membership.id, membership.clone());
        Ok(membership)
    }

    async fn revoke(
        &self,
        identity_id: IdentityId,
        tenant_id: TenantId,
        actor: IdentityId,
    ) -> AppResult<Option<Membership>> {
        let mut state = self.lock()?;
        let Some(id) = state
            .active_membership(identity_id, tenant_id)
            .map(|m| m.id)
        else {
            return Ok(None);
        };

        Ok(state.memberships.get_mut(&id).map(|m| {
            m.status = MembershipStatus::Revoked;
            m.revoked_at = Some(Utc::now());
            m.updated_by = Some(actor);
            m.clone()
        }))
    }
}
