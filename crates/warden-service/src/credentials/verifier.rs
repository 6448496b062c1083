//! Credential verifier.
//!
//! Unknown email, wrong secret and inactive identity fail identically. An
//! unknown email still pays for one digest comparison against a dummy digest.

use std::sync::Arc;

use tracing::{debug, warn};

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::SecretHasher;
use warden_entity::identity::Identity;

use crate::identity::IdentityService;

/// Input hashed once at construction to produce the dummy digest.
const DUMMY_SECRET: &str = "warden-unknown-identity";

/// Verifies an email/secret pair against the stored identity.
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    identities: Arc<IdentityService>,
    hasher: Arc<dyn SecretHasher>,
    dummy_digest: String,
}

impl CredentialVerifier {
    /// Create a verifier; hashes the dummy digest with `hasher`.
    pub fn new(identities: Arc<IdentityService>, hasher: Arc<dyn SecretHasher>) -> AppResult<Self> {
        let dummy_digest = hasher.hash(DUMMY_SECRET)?;
        Ok(Self {
            identities,
            hasher,
            dummy_digest,
        })
    }

    /// Return the identity owning `email` if `secret` matches and it is active.
    pub async fn verify(&self, email: &str, secret: &str) -> AppResult<Identity> {
        let Some(identity) = self.identities.find_by_email(email).await? else {
            // Result ignored: only the cost matters.
            let _ = self.hasher.matches(secret, &self.dummy_digest);
            debug!("Credential check failed: unknown email");
            return Err(AppError::credentials_invalid());
        };

        let matches = self
            .hasher
            .matches(secret, &identity.secret_digest)
            .unwrap_or_else(|e| {
                warn!(identity_id = %identity.id, error = %e, "Stored secret digest is unusable");
                false
            });

        if !matches {
            debug!(identity_id = %identity.id, "Credential check failed: secret mismatch");
            return Err(AppError::credentials_invalid());
        }
        if !identity.active {
            debug!(identity_id = %identity.id, "Credential check failed: identity inactive");
            return Err(AppError::credentials_invalid());
        }

        Ok(identity)
    }
}
