//! Tenant service.

use std::sync::Arc;

use tracing::info;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::{IdentityId, TenantId};
use warden_database::TenantStore;
use warden_entity::identity::Identity;
use warden_entity::membership::Membership;
use warden_entity::role::StandingRole;
use warden_entity::tenant::{NewTenant, PlanTier, Tenant, TenantStatus};

use crate::membership::MembershipResolver;

/// Maximum workspace name length in characters.
const MAX_NAME_LENGTH: usize = 120;

/// Creates and maintains tenants.
#[derive(Debug, Clone)]
pub struct TenantService {
    store: Arc<dyn TenantStore>,
    memberships: Arc<MembershipResolver>,
}

impl TenantService {
    /// Create a new tenant service.
    pub fn new(store: Arc<dyn TenantStore>, memberships: Arc<MembershipResolver>) -> Self {
        Self { store, memberships }
    }

    /// Create a tenant with its standing roles and make `owner` its owner.
    pub async fn create_owned(
        &self,
        owner: IdentityId,
        name: &str,
    ) -> AppResult<(Tenant, Membership)> {
        let data = NewTenant {
            name: validate_name(name)?,
            plan: PlanTier::Starter,
            created_by: Some(owner),
        };
        self.bootstrap(owner, &data).await
    }

    /// Create the workspace every identity gets at signup.
    pub async fn create_default_workspace(
        &self,
        identity: &Identity,
    ) -> AppResult<(Tenant, Membership)> {
        let data = NewTenant::default_for(&identity.display_name, identity.id);
        self.bootstrap(identity.id, &data).await
    }

    /// Tenant and standing roles commit together; the owner membership
    /// follows through the resolver so its cache entries stay coherent.
    async fn bootstrap(&self, owner: IdentityId, data: &NewTenant) -> AppResult<(Tenant, Membership)> {
        let (tenant, roles) = self
            .store
            .create_with_roles(data, &StandingRole::ALL)
            .await?;
        let owner_role = roles
            .iter()
            .find(|r| r.name == StandingRole::Owner.name())
            .ok_or_else(|| AppError::internal("Tenant was created without an owner role"))?;

        let membership = self
            .memberships
            .add_membership(owner, owner, tenant.id, owner_role.id)
            .await?;

        info!(tenant_id = %tenant.id, owner = %owner, "Tenant created");
        Ok((tenant, membership))
    }

    /// Find a tenant by id.
    pub async fn find(&self, id: TenantId) -> AppResult<Option<Tenant>> {
        self.store.find_by_id(id).await
    }

    /// Get a tenant by id or fail with `NotFound`.
    pub async fn get(&self, id: TenantId) -> AppResult<Tenant> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tenant {id} not found")))
    }

    /// Rename a tenant.
    pub async fn rename(&self, actor: IdentityId, id: TenantId, name: &str) -> AppResult<Tenant> {
        let tenant = self.store.rename(id, &validate_name(name)?).await?;
        info!(tenant_id = %id, actor = %actor, "Tenant renamed");
        Ok(tenant)
    }

    /// Suspend or reactivate a tenant. Suspended tenants cannot be logged
    /// into or switched to.
    pub async fn set_status(
        &self,
        actor: IdentityId,
        id: TenantId,
        status: TenantStatus,
    ) -> AppResult<Tenant> {
        let tenant = self.store.set_status(id, status).await?;
        info!(tenant_id = %id, actor = %actor, %status, "Tenant status changed");
        Ok(tenant)
    }
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Workspace name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "Workspace name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}
