//! Claim sets carried by access and refresh tokens.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use warden_core::types::{IdentityId, TenantId};

/// Distinguishes access tokens from refresh tokens (`typ` claim).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived token carrying authorization claims.
    Access,
    /// Long-lived token that can only mint access tokens.
    Refresh,
}

impl TokenKind {
    /// The `typ` claim value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an access token authorizes: one identity acting in one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    /// Identity the token was issued to.
    #[serde(rename = "sub")]
    pub identity_id: IdentityId,
    /// Email at issuance.
    pub email: String,
    /// Display name at issuance.
    pub name: String,
    /// Tenant the token is scoped to.
    #[serde(rename = "tid")]
    pub tenant_id: TenantId,
    /// Role name held in the tenant.
    pub role: String,
    /// Sorted permission codes of the role.
    #[serde(rename = "perms")]
    pub permissions: Vec<String>,
}

/// Full claim set of an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Authorization payload.
    #[serde(flatten)]
    pub grant: AccessGrant,
    /// Issuer.
    pub iss: String,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
    /// Unique token id.
    pub jti: Uuid,
    /// Always [`TokenKind::Access`].
    pub typ: TokenKind,
}

impl AccessClaims {
    /// Identity the token was issued to.
    pub fn identity_id(&self) -> IdentityId {
        self.grant.identity_id
    }

    /// Tenant the token is scoped to.
    pub fn tenant_id(&self) -> TenantId {
        self.grant.tenant_id
    }

    /// Whether the token carries `code`.
    pub fn has_permission(&self, code: &str) -> bool {
        self.grant.permissions.iter().any(|p| p == code)
    }

    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Claim set of a refresh token. Carries no authorization data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Identity the token was issued to.
    pub sub: IdentityId,
    /// Tenant the session was scoped to.
    pub tid: TenantId,
    /// Issuer.
    pub iss: String,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
    /// Unique token id.
    pub jti: Uuid,
    /// Always [`TokenKind::Refresh`].
    pub typ: TokenKind,
}

impl RefreshClaims {
    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_claims_use_short_names() {
        let claims = AccessClaims {
            grant: AccessGrant {
                identity_id: IdentityId::new(),
                email: "ann@example.com".into(),
                name: "Ann".into(),
                tenant_id: TenantId::new(),
                role: "owner".into(),
                permissions: vec!["budget:read".into()],
            },
            iss: "warden".into(),
            iat: 0,
            exp: 60,
            jti: Uuid::new_v4(),
            typ: TokenKind::Access,
        };

        let json = serde_json::to_value(&claims).unwrap();
        for field in ["sub", "email", "name", "tid", "role", "perms", "typ"] {
            assert!(json.get(field).is_some(), "missing claim {field}");
        }
        assert_eq!(json["typ"], "access");
        assert!(claims.has_permission("budget:read"));
    }
}
