//! Permission codes.
//!
//! Codes follow the `resource:action` convention and are what access tokens
//! carry in their `perms` claim. The catalog is fixed and seeded by the
//! initial migration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single grantable permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    /// Read transactions.
    #[serde(rename = "transaction:read")]
    TransactionRead,
    /// Create and edit transactions.
    #[serde(rename = "transaction:write")]
    TransactionWrite,
    /// Read budgets.
    #[serde(rename = "budget:read")]
    BudgetRead,
    /// Create and edit budgets.
    #[serde(rename = "budget:write")]
    BudgetWrite,
    /// Read reports.
    #[serde(rename = "report:read")]
    ReportRead,
    /// Read user profiles.
    #[serde(rename = "user:read")]
    UserRead,
    /// Edit user profiles.
    #[serde(rename = "user:write")]
    UserWrite,
    /// Read workspace details.
    #[serde(rename = "workspace:read")]
    WorkspaceRead,
    /// Change workspace settings.
    #[serde(rename = "workspace:settings")]
    WorkspaceSettings,
    /// Manage workspace members.
    #[serde(rename = "workspace:members")]
    WorkspaceMembers,
}

/// Permissions granted to the standing `viewer` role.
pub const VIEWER_PERMISSIONS: [Permission; 5] = [
    Permission::TransactionRead,
    Permission::BudgetRead,
    Permission::ReportRead,
    Permission::UserRead,
    Permission::WorkspaceRead,
];

impl Permission {
    /// Every permission in the catalog.
    pub const ALL: [Permission; 10] = [
        Self::TransactionRead,
        Self::TransactionWrite,
        Self::BudgetRead,
        Self::BudgetWrite,
        Self::ReportRead,
        Self::UserRead,
        Self::UserWrite,
        Self::WorkspaceRead,
        Self::WorkspaceSettings,
        Self::WorkspaceMembers,
    ];

    /// Return the wire code of the permission.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransactionRead => "transaction:read",
            Self::TransactionWrite => "transaction:write",
            Self::BudgetRead => "budget:read",
            Self::BudgetWrite => "budget:write",
            Self::ReportRead => "report:read",
            Self::UserRead => "user:read",
            Self::UserWrite => "user:write",
            Self::WorkspaceRead => "workspace:read",
            Self::WorkspaceSettings => "workspace:settings",
            Self::WorkspaceMembers => "workspace:members",
        }
    }

    /// Codes of all catalog permissions.
    pub fn all_codes() -> Vec<String> {
        Self::ALL.iter().map(|p| p.as_str().to_string()).collect()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = warden_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| warden_core::AppError::validation(format!("Unknown permission: '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_parse_back() {
        for permission in Permission::ALL {
            assert_eq!(permission.as_str().parse::<Permission>().unwrap(), permission);
        }
        assert!("transaction:delete".parse::<Permission>().is_err());
    }

    #[test]
    fn test_viewer_is_read_only() {
        assert!(VIEWER_PERMISSIONS.iter().all(|p| p.as_str().ends_with(":read")));
    }

    #[test]
    fn test_serde_uses_wire_code() {
        let json = serde_json::to_string(&Permission::WorkspaceMembers).unwrap();
        assert_eq!(json, "\"workspace:members\"");
    }
}
