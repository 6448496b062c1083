//! Service registry: wires the full service graph once at startup.

use std::sync::Arc;

use warden_auth::{PasswordValidator, TokenService};
use warden_cache::ReadThroughCache;
use warden_core::config::AuthConfig;
use warden_core::result::AppResult;
use warden_core::traits::SecretHasher;
use warden_database::Stores;

use crate::credentials::CredentialVerifier;
use crate::identity::IdentityService;
use crate::membership::MembershipResolver;
use crate::role::RoleCatalog;
use crate::session::SessionOrchestrator;
use crate::tenant::TenantService;

/// Every service, constructed against one set of stores and one cache.
#[derive(Debug, Clone)]
pub struct Services {
    /// Identity reads and mutations.
    pub identities: Arc<IdentityService>,
    /// Credential verification.
    pub verifier: Arc<CredentialVerifier>,
    /// Membership resolution.
    pub memberships: Arc<MembershipResolver>,
    /// Roles and permissions.
    pub roles: Arc<RoleCatalog>,
    /// Tenant lifecycle.
    pub tenants: Arc<TenantService>,
    /// Token issuance and validation.
    pub tokens: Arc<TokenService>,
    /// Session lifecycle.
    pub sessions: Arc<SessionOrchestrator>,
}

impl Services {
    /// Build the service graph.
    pub fn new(
        stores: Stores,
        cache: ReadThroughCache,
        hasher: Arc<dyn SecretHasher>,
        auth: &AuthConfig,
    ) -> AppResult<Self> {
        let identities = Arc::new(IdentityService::new(stores.identities, cache.clone()));
        let verifier = Arc::new(CredentialVerifier::new(
            Arc::clone(&identities),
            Arc::clone(&hasher),
        )?);
        let memberships = Arc::new(MembershipResolver::new(
            stores.memberships,
            Arc::clone(&identities),
            cache,
        ));
        let roles = Arc::new(RoleCatalog::new(stores.roles));
        let tenants = Arc::new(TenantService::new(
            stores.tenants,
            Arc::clone(&memberships),
        ));
        let tokens = Arc::new(TokenService::new(auth)?);

        let sessions = Arc::new(SessionOrchestrator::new(
            Arc::clone(&verifier),
            Arc::clone(&identities),
            Arc::clone(&memberships),
            Arc::clone(&roles),
            Arc::clone(&tenants),
            Arc::clone(&tokens),
            hasher,
            PasswordValidator::new(auth),
        ));

        Ok(Self {
            identities,
            verifier,
            memberships,
            roles,
            tenants,
            tokens,
            sessions,
        })
    }
}
