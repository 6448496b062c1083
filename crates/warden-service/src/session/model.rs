//! Session request and response types.

use serde::{Deserialize, Serialize};
use validator::Validate;

use warden_auth::IssuedToken;
use warden_entity::identity::IdentitySummary;
use warden_entity::tenant::TenantSummary;

/// Signup input.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    /// Email; becomes the login name.
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Plain secret; checked against the password policy.
    #[validate(length(min = 1, message = "Password is required"))]
    pub secret: String,
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
}

/// An authenticated session scoped to one tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Access token.
    pub access: IssuedToken,
    /// Refresh token.
    pub refresh: IssuedToken,
    /// Authenticated identity.
    pub identity: IdentitySummary,
    /// Tenant the session is scoped to.
    pub tenant: TenantSummary,
    /// Role held in the tenant.
    pub role: String,
    /// Sorted permission codes of the role.
    pub permissions: Vec<String>,
}

/// Result of a refresh: a new access token only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshedAccess {
    /// Access token.
    pub access: IssuedToken,
}

/// Logout acknowledgement. Tokens are stateless, so logout only tells the
/// transport to drop both credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutAck {
    /// Drop the access credential.
    pub clear_access: bool,
    /// Drop the refresh credential.
    pub clear_refresh: bool,
}

impl Default for LogoutAck {
    fn default() -> Self {
        Self {
            clear_access: true,
            clear_refresh: true,
        }
    }
}

/// A tenant the identity can switch to, with the role held there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceSummary {
    /// Tenant.
    pub tenant: TenantSummary,
    /// Role name.
    pub role: String,
    /// Whether this is the primary tenant.
    pub primary: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_request_validation() {
        let ok = SignupRequest {
            email: "ann@example.com".into(),
            secret: "x".into(),
            name: "Ann".into(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = SignupRequest {
            email: "ann.example.com".into(),
            ..ok.clone()
        };
        assert!(bad_email.validate().is_err());

        let no_name = SignupRequest {
            name: String::new(),
            ..ok
        };
        assert!(no_name.validate().is_err());
    }
}
