//! Enforces tenant scoping and permission membership on access claims.

use tracing::debug;

use warden_core::error::AppError;
use warden_core::types::TenantId;
use warden_entity::role::Permission;

use crate::jwt::AccessClaims;

/// Authorization decisions backed only by the token's claims.
///
/// A permission is granted iff its code is in the token's `perms` claim and
/// the token is scoped to the tenant being acted on.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionEnforcer;

impl PermissionEnforcer {
    /// Create an enforcer.
    pub fn new() -> Self {
        Self
    }

    /// Whether the claims carry `permission`.
    pub fn has_permission(&self, claims: &AccessClaims, permission: Permission) -> bool {
        claims.has_permission(permission.as_str())
    }

    /// Require the claims to be scoped to `tenant_id`.
    pub fn require_tenant(&self, claims: &AccessClaims, tenant_id: TenantId) -> Result<(), AppError> {
        if claims.tenant_id() == tenant_id {
            Ok(())
        } else {
            debug!(
                identity_id = %claims.identity_id(),
                token_tenant = %claims.tenant_id(),
                requested_tenant = %tenant_id,
                "Token scoped to a different tenant"
            );
            Err(AppError::access_denied())
        }
    }

    /// Require `permission` in the claims' tenant.
    pub fn require_permission(
        &self,
        claims: &AccessClaims,
        permission: Permission,
    ) -> Result<(), AppError> {
        if self.has_permission(claims, permission) {
            Ok(())
        } else {
            debug!(
                identity_id = %claims.identity_id(),
                tenant_id = %claims.tenant_id(),
                %permission,
                "Permission denied"
            );
            Err(AppError::access_denied())
        }
    }

    /// Require `permission` in a specific tenant.
    pub fn require(
        &self,
        claims: &AccessClaims,
        tenant_id: TenantId,
        permission: Permission,
    ) -> Result<(), AppError> {
        self.require_tenant(claims, tenant_id)?;
        self.require_permission(claims, permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::{AccessGrant, TokenKind};
    use uuid::Uuid;
    use warden_core::ErrorKind;
    use warden_core::types::IdentityId;
    use warden_entity::role::StandingRole;

    fn viewer_claims(tenant_id: TenantId) -> AccessClaims {
        AccessClaims {
            grant: AccessGrant {
                identity_id: IdentityId::new(),
                email: "ann@example.com".into(),
                name: "Ann".into(),
                tenant_id,
                role: StandingRole::Viewer.name().into(),
                permissions: StandingRole::Viewer.permission_codes(),
            },
            iss: "warden".into(),
            iat: 0,
            exp: 0,
            jti: Uuid::new_v4(),
            typ: TokenKind::Access,
        }
    }

    #[test]
    fn test_viewer_can_read_not_write() {
        let tenant = TenantId::new();
        let claims = viewer_claims(tenant);
        let enforcer = PermissionEnforcer::new();

        assert!(enforcer.require(&claims, tenant, Permission::BudgetRead).is_ok());
        let err = enforcer
            .require(&claims, tenant, Permission::BudgetWrite)
            .unwrap_err();
        assert!(err.is(ErrorKind::AccessDenied));
    }

    #[test]
    fn test_other_tenant_is_denied() {
        let claims = viewer_claims(TenantId::new());
        let err = PermissionEnforcer::new()
            .require(&claims, TenantId::new(), Permission::BudgetRead)
            .unwrap_err();
        assert!(err.is(ErrorKind::AccessDenied));
    }
}
