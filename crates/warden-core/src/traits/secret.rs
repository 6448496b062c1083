//! Secret hashing capability.

use crate::result::AppResult;

/// One-way hashing of user secrets.
///
/// The session core only ever calls these two operations; the concrete
/// algorithm (Argon2id in production) is injected.
pub trait SecretHasher: Send + Sync + std::fmt::Debug + 'static {
    /// Hash a plaintext secret into a self-describing digest string.
    fn hash(&self, plain: &str) -> AppResult<String>;

    /// Check a plaintext secret against a stored digest.
    ///
    /// Returns `Ok(false)` on mismatch; `Err` only when the digest itself
    /// is unusable.
    fn matches(&self, plain: &str, digest: &str) -> AppResult<bool>;
}
