//! Session orchestrator.
//!
//! Composes credential verification, membership resolution and the role
//! catalog into token issuance. Every issued access token is built from
//! the identity's current role in exactly one tenant.

use std::sync::Arc;

use tracing::{debug, info};
use validator::Validate;

use warden_auth::{AccessGrant, IssuedToken, PasswordValidator, TokenPair, TokenService};
use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::traits::SecretHasher;
use warden_core::types::{IdentityId, TenantId};
use warden_entity::identity::{Identity, IdentitySummary, NewIdentity};
use warden_entity::membership::Membership;
use warden_entity::role::Role;
use warden_entity::tenant::{Tenant, TenantSummary};

use super::model::{AuthSession, LogoutAck, RefreshedAccess, SignupRequest, WorkspaceSummary};
use crate::credentials::CredentialVerifier;
use crate::identity::IdentityService;
use crate::membership::MembershipResolver;
use crate::role::RoleCatalog;
use crate::tenant::TenantService;

/// A membership whose tenant is usable, with the tenant loaded.
struct Scope {
    membership: Membership,
    tenant: Tenant,
}

/// Entry point for every session lifecycle operation.
#[derive(Debug, Clone)]
pub struct SessionOrchestrator {
    verifier: Arc<CredentialVerifier>,
    identities: Arc<IdentityService>,
    memberships: Arc<MembershipResolver>,
    catalog: Arc<RoleCatalog>,
    tenants: Arc<TenantService>,
    tokens: Arc<TokenService>,
    hasher: Arc<dyn SecretHasher>,
    passwords: PasswordValidator,
}

impl SessionOrchestrator {
    /// Create a new orchestrator.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        verifier: Arc<CredentialVerifier>,
        identities: Arc<IdentityService>,
        memberships: Arc<MembershipResolver>,
        catalog: Arc<RoleCatalog>,
        tenants: Arc<TenantService>,
        tokens: Arc<TokenService>,
        hasher: Arc<dyn SecretHasher>,
        passwords: PasswordValidator,
    ) -> Self {
        Self {
            verifier,
            identities,
            memberships,
            catalog,
            tenants,
            tokens,
            hasher,
            passwords,
        }
    }

    /// Authenticate and open a session in the primary tenant.
    pub async fn login(&self, email: &str, secret: &str) -> AppResult<AuthSession> {
        let identity = self.verifier.verify(email, secret).await?;

        let scope = self
            .usable_scopes(identity.id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                info!(identity_id = %identity.id, "Login refused: no active workspace");
                AppError::no_active_tenant()
            })?;

        let session = self.open_session(&identity, scope).await?;
        info!(
            identity_id = %identity.id,
            tenant_id = %session.tenant.id,
            "Login succeeded"
        );
        Ok(session)
    }

    /// Register an identity with its own workspace and open a session in it.
    pub async fn signup(&self, request: SignupRequest) -> AppResult<AuthSession> {
        request
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Name cannot be blank"));
        }
        self.passwords
            .validate(&request.secret, &[request.email.as_str(), name])?;

        let identity = self
            .identities
            .create(NewIdentity {
                email: request.email.clone(),
                secret_digest: self.hasher.hash(&request.secret)?,
                display_name: name.to_string(),
            })
            .await?;

        let (tenant, membership) = self.tenants.create_default_workspace(&identity).await?;
        let identity = self
            .identities
            .set_last_tenant(identity.id, identity.id, tenant.id)
            .await?;

        let session = self
            .open_session(&identity, Scope { membership, tenant })
            .await?;
        info!(
            identity_id = %identity.id,
            tenant_id = %session.tenant.id,
            "Signup completed"
        );
        Ok(session)
    }

    /// Exchange a refresh token for a new access token in the same tenant.
    ///
    /// Authority is re-derived from the store: the token's tenant must still
    /// hold an active membership with a usable tenant.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<RefreshedAccess> {
        let claims = self.tokens.validate_refresh(refresh_token)?;

        let identity = match self.identities.find_by_id(claims.sub).await? {
            Some(identity) if identity.active => identity,
            _ => {
                debug!(identity_id = %claims.sub, "Refresh refused: identity gone or inactive");
                return Err(AppError::credentials_invalid());
            }
        };

        let memberships = self.memberships.active_memberships_of(identity.id).await?;
        if memberships.is_empty() {
            return Err(AppError::no_active_tenant());
        }
        let membership = memberships
            .into_iter()
            .find(|m| m.tenant_id == claims.tid)
            .ok_or_else(AppError::access_denied)?;
        let tenant = self.usable_tenant(claims.tid).await?;

        let (grant, _) = self.grant_for(&identity, &membership, &tenant).await?;
        let access = self.tokens.issue_access_token(grant)?;

        debug!(identity_id = %identity.id, tenant_id = %claims.tid, "Access token refreshed");
        Ok(RefreshedAccess { access })
    }

    /// Re-scope a session to another tenant the identity belongs to.
    ///
    /// Any reason the switch cannot happen surfaces as `AccessDenied`.
    pub async fn switch_tenant(
        &self,
        identity_id: IdentityId,
        tenant_id: TenantId,
    ) -> AppResult<TokenPair> {
        let identity = match self.identities.find_by_id(identity_id).await? {
            Some(identity) if identity.active => identity,
            _ => return Err(AppError::access_denied()),
        };
        let membership = self
            .memberships
            .membership_of(identity_id, tenant_id)
            .await
            .map_err(deny_not_found)?;
        let tenant = self.usable_tenant(tenant_id).await?;

        let identity = self
            .identities
            .set_last_tenant(identity_id, identity_id, tenant_id)
            .await?;
        let (grant, _) = self.grant_for(&identity, &membership, &tenant).await?;
        let pair = self.tokens.issue_pair(grant)?;

        info!(%identity_id, %tenant_id, "Switched workspace");
        Ok(pair)
    }

    /// Acknowledge a logout.
    pub fn logout(&self) -> LogoutAck {
        LogoutAck::default()
    }

    /// Create an additional workspace owned by `actor`.
    pub async fn create_workspace(&self, actor: IdentityId, name: &str) -> AppResult<TenantSummary> {
        match self.identities.find_by_id(actor).await? {
            Some(identity) if identity.active => {}
            _ => return Err(AppError::access_denied()),
        }
        let (tenant, _) = self.tenants.create_owned(actor, name).await?;
        Ok(TenantSummary::from(&tenant))
    }

    /// Workspaces the identity can use, primary first.
    pub async fn workspaces_of(&self, identity_id: IdentityId) -> AppResult<Vec<WorkspaceSummary>> {
        let mut summaries = Vec::new();
        for scope in self.usable_scopes(identity_id).await? {
            let role = self.catalog.role_of(&scope.membership).await?;
            summaries.push(WorkspaceSummary {
                tenant: TenantSummary::from(&scope.tenant),
                role: role.name,
                primary: summaries.is_empty(),
            });
        }
        Ok(summaries)
    }

    /// Issue a fresh access token reflecting the identity's current profile.
    pub async fn reissue_access(
        &self,
        identity_id: IdentityId,
        tenant_id: TenantId,
    ) -> AppResult<IssuedToken> {
        let identity = match self.identities.find_by_id(identity_id).await? {
            Some(identity) if identity.active => identity,
            _ => return Err(AppError::credentials_invalid()),
        };
        let membership = self
            .memberships
            .membership_of(identity_id, tenant_id)
            .await
            .map_err(deny_not_found)?;
        let tenant = self.usable_tenant(tenant_id).await?;

        let (grant, _) = self.grant_for(&identity, &membership, &tenant).await?;
        self.tokens.issue_access_token(grant)
    }

    /// Change the identity's email and reissue its access token so the
    /// `email` claim is current.
    pub async fn change_email(
        &self,
        identity_id: IdentityId,
        tenant_id: TenantId,
        new_email: &str,
    ) -> AppResult<IssuedToken> {
        self.identities
            .update_email(identity_id, identity_id, new_email)
            .await?;
        self.reissue_access(identity_id, tenant_id).await
    }

    /// Active memberships whose tenant is usable, primary first.
    async fn usable_scopes(&self, identity_id: IdentityId) -> AppResult<Vec<Scope>> {
        let mut scopes = Vec::new();
        for membership in self.memberships.active_memberships_of(identity_id).await? {
            match self.tenants.find(membership.tenant_id).await? {
                Some(tenant) if tenant.is_usable() => scopes.push(Scope { membership, tenant }),
                _ => debug!(
                    %identity_id,
                    tenant_id = %membership.tenant_id,
                    "Skipping unusable workspace"
                ),
            }
        }
        Ok(scopes)
    }

    async fn usable_tenant(&self, tenant_id: TenantId) -> AppResult<Tenant> {
        match self.tenants.find(tenant_id).await? {
            Some(tenant) if tenant.is_usable() => Ok(tenant),
            _ => Err(AppError::access_denied()),
        }
    }

    async fn grant_for(
        &self,
        identity: &Identity,
        membership: &Membership,
        tenant: &Tenant,
    ) -> AppResult<(AccessGrant, Role)> {
        let role = self.catalog.role_of(membership).await?;
        let grant = AccessGrant {
            identity_id: identity.id,
            email: identity.email.clone(),
            name: identity.display_name.clone(),
            tenant_id: tenant.id,
            role: role.name.clone(),
            permissions: self.catalog.permissions_of(&role).into_iter().collect(),
        };
        Ok((grant, role))
    }

    async fn open_session(&self, identity: &Identity, scope: Scope) -> AppResult<AuthSession> {
        let (grant, role) = self
            .grant_for(identity, &scope.membership, &scope.tenant)
            .await?;
        let permissions = grant.permissions.clone();
        let TokenPair { access, refresh } = self.tokens.issue_pair(grant)?;

        Ok(AuthSession {
            access,
            refresh,
            identity: IdentitySummary::from(identity),
            tenant: TenantSummary::from(&scope.tenant),
            role: role.name,
            permissions,
        })
    }
}

/// Collapse a missing membership into the fixed access-denied error.
fn deny_not_found(e: AppError) -> AppError {
    if e.is(ErrorKind::NotFound) {
        AppError::access_denied()
    } else {
        e
    }
}
