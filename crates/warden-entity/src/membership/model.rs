//! Membership entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warden_core::types::{IdentityId, MembershipId, RoleId, TenantId};

use super::status::MembershipStatus;

/// Links an identity to a tenant with exactly one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Membership {
    /// Unique membership identifier.
    pub id: MembershipId,
    /// Member identity.
    pub identity_id: IdentityId,
    /// Tenant the identity belongs to.
    pub tenant_id: TenantId,
    /// Role held in the tenant.
    pub role_id: RoleId,
    /// Current status.
    pub status: MembershipStatus,
    /// Insertion sequence, used for stable ordering.
    pub seq: i64,
    /// When the identity joined.
    pub joined_at: DateTime<Utc>,
    /// When the membership was revoked.
    pub revoked_at: Option<DateTime<Utc>>,
    /// Last actor to change the row.
    pub updated_by: Option<IdentityId>,
}

impl Membership {
    /// Check if the membership currently grants access.
    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }
}

/// Data required to insert an active membership.
#[derive(Debug, Clone)]
pub struct NewMembership {
    /// Member identity.
    pub identity_id: IdentityId,
    /// Tenant.
    pub tenant_id: TenantId,
    /// Role held.
    pub role_id: RoleId,
    /// Acting identity.
    pub created_by: IdentityId,
}
