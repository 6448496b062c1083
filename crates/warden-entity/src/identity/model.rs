//! Identity entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warden_core::types::{IdentityId, TenantId};

use crate::membership::Membership;

/// A registered identity, independent of any tenant.
///
/// The secret digest is serialized because identities are cached as JSON;
/// use [`IdentitySummary`] for anything leaving the service boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Identity {
    /// Unique identity identifier.
    pub id: IdentityId,
    /// Unique email, matched exactly as stored.
    pub email: String,
    /// Secret digest produced by the hashing capability.
    pub secret_digest: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Inactive identities cannot authenticate.
    pub active: bool,
    /// Tenant the identity last worked in, if any.
    pub last_tenant_id: Option<TenantId>,
    /// When the identity was created.
    pub created_at: DateTime<Utc>,
    /// When the identity was last updated.
    pub updated_at: DateTime<Utc>,
    /// Actor responsible for the last update.
    pub updated_by: Option<IdentityId>,
}

/// Data required to create a new identity.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    /// Email address.
    pub email: String,
    /// Pre-hashed secret.
    pub secret_digest: String,
    /// Display name.
    pub display_name: String,
}

/// Public projection of an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySummary {
    /// Identity ID.
    pub id: IdentityId,
    /// Email address.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Whether the identity is active.
    pub active: bool,
}

impl From<&Identity> for IdentitySummary {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            active: identity.active,
        }
    }
}

/// Outcome of deleting an identity: the removed row and the memberships
/// that were removed with it.
#[derive(Debug, Clone)]
pub struct IdentityRemoval {
    /// The deleted identity.
    pub identity: Identity,
    /// Memberships removed by the cascade.
    pub memberships: Vec<Membership>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_omits_digest() {
        let now = Utc::now();
        let identity = Identity {
            id: IdentityId::new(),
            email: "ann@example.com".to_string(),
            secret_digest: "$argon2id$digest".to_string(),
            display_name: "Ann".to_string(),
            active: true,
            last_tenant_id: None,
            created_at: now,
            updated_at: now,
            updated_by: None,
        };

        let summary = IdentitySummary::from(&identity);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("argon2id"));
        assert_eq!(summary.email, identity.email);
    }
}
