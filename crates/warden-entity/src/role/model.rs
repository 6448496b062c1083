//! Role entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use warden_core::types::{RoleId, TenantId};

use super::permission::{Permission, VIEWER_PERMISSIONS};

/// A named, tenant-scoped bundle of permission codes.
///
/// The permission set is fixed when the role is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Unique role identifier.
    pub id: RoleId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Role name, unique within the tenant.
    pub name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// Whether the role was created by the system.
    pub system: bool,
    /// Sorted permission codes.
    pub permissions: Vec<String>,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
}

impl Role {
    /// Check whether the role grants the given permission code.
    pub fn grants(&self, code: &str) -> bool {
        self.permissions.binary_search_by(|p| p.as_str().cmp(code)).is_ok()
    }
}

/// Data required to insert a role.
#[derive(Debug, Clone)]
pub struct NewRole {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Role name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// System flag.
    pub system: bool,
    /// Permission codes; stored sorted and deduplicated.
    pub permissions: Vec<String>,
}

/// The roles every tenant is bootstrapped with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StandingRole {
    /// Holds the full permission catalog.
    Owner,
    /// Holds the read-only subset.
    Viewer,
}

impl StandingRole {
    /// All standing roles in creation order.
    pub const ALL: [StandingRole; 2] = [Self::Owner, Self::Viewer];

    /// Role name as stored.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Viewer => "viewer",
        }
    }

    /// Stored description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Owner => "Full access to the workspace",
            Self::Viewer => "Read-only access to the workspace",
        }
    }

    /// Permission codes granted by this role, sorted.
    pub fn permission_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = match self {
            Self::Owner => Permission::all_codes(),
            Self::Viewer => VIEWER_PERMISSIONS
                .iter()
                .map(|p| p.as_str().to_string())
                .collect(),
        };
        codes.sort();
        codes
    }

    /// Build the row for this role in the given tenant.
    pub fn new_role(&self, tenant_id: TenantId) -> NewRole {
        NewRole {
            tenant_id,
            name: self.name().to_string(),
            description: Some(self.description().to_string()),
            system: true,
            permissions: self.permission_codes(),
        }
    }
}

impl fmt::Display for StandingRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_holds_full_catalog() {
        assert_eq!(StandingRole::Owner.permission_codes().len(), Permission::ALL.len());
    }

    #[test]
    fn test_role_grants_uses_sorted_codes() {
        let row = StandingRole::Viewer.new_role(TenantId::new());
        let role = Role {
            id: RoleId::new(),
            tenant_id: row.tenant_id,
            name: row.name,
            description: row.description,
            system: row.system,
            permissions: row.permissions,
            created_at: Utc::now(),
        };
        assert!(role.grants("budget:read"));
        assert!(!role.grants("budget:write"));
    }
}
