//! Tenant entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warden_core::types::{IdentityId, TenantId};

use super::plan::PlanTier;
use super::status::TenantStatus;

/// Suffix appended to a user's name for the workspace created at signup.
const DEFAULT_WORKSPACE_SUFFIX: &str = "'s Workspace";

/// An isolated workspace that identities join through memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    /// Unique tenant identifier.
    pub id: TenantId,
    /// Workspace name.
    pub name: String,
    /// Lifecycle status.
    pub status: TenantStatus,
    /// Billing plan tier.
    pub plan: PlanTier,
    /// End of the trial period, if the tenant is on trial.
    pub trial_ends_at: Option<DateTime<Utc>>,
    /// When the tenant was created.
    pub created_at: DateTime<Utc>,
    /// When the tenant was last updated.
    pub updated_at: DateTime<Utc>,
    /// Identity that created the tenant.
    pub created_by: Option<IdentityId>,
}

impl Tenant {
    /// Whether sessions may be scoped to this tenant.
    pub fn is_usable(&self) -> bool {
        self.status.is_usable()
    }
}

/// Data required to create a tenant.
#[derive(Debug, Clone)]
pub struct NewTenant {
    /// Workspace name.
    pub name: String,
    /// Plan tier.
    pub plan: PlanTier,
    /// Creating identity.
    pub created_by: Option<IdentityId>,
}

impl NewTenant {
    /// The workspace created for a freshly signed-up user.
    pub fn default_for(display_name: &str, created_by: IdentityId) -> Self {
        Self {
            name: format!("{display_name}{DEFAULT_WORKSPACE_SUFFIX}"),
            plan: PlanTier::Starter,
            created_by: Some(created_by),
        }
    }
}

/// Public projection of a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSummary {
    /// Tenant ID.
    pub id: TenantId,
    /// Workspace name.
    pub name: String,
    /// Lifecycle status.
    pub status: TenantStatus,
    /// Plan tier.
    pub plan: PlanTier,
}

impl From<&Tenant> for TenantSummary {
    fn from(tenant: &Tenant) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name.clone(),
            status: tenant.status,
            plan: tenant.plan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_workspace_name() {
        let tenant = NewTenant::default_for("Ann", IdentityId::new());
        assert_eq!(tenant.name, "Ann's Workspace");
        assert_eq!(tenant.plan, PlanTier::Starter);
    }
}
