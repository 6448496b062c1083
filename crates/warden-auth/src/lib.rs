//! # warden-auth
//!
//! Credential primitives for Warden.
//!
//! ## Modules
//!
//! - `jwt`: access/refresh token issuance and stateless validation
//! - `password`: Argon2id secret hashing and password policy
//! - `rbac`: permission checks against validated access claims

pub mod jwt;
pub mod password;
pub mod rbac;

pub use jwt::{
    AccessClaims, AccessGrant, IssuedToken, RefreshClaims, TokenKind, TokenPair, TokenService,
    bearer_token,
};
pub use password::{Argon2Hasher, PasswordValidator};
pub use rbac::PermissionEnforcer;
