//! Secret hashing and password policy.

pub mod hasher;
pub mod validator;

pub use hasher::Argon2Hasher;
pub use validator::PasswordValidator;
