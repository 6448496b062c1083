//! Unified application error types for Warden.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Every [`ErrorKind`] carries a stable
//! code and a transport-independent [`StatusClass`] that an outer layer
//! translates into its own status vocabulary.

use std::fmt;
use thiserror::Error;

/// Fixed message for every credential verification failure.
///
/// Unknown email, wrong secret and inactive identity must be
/// indistinguishable to the caller.
pub const CREDENTIALS_INVALID_MESSAGE: &str = "Invalid email or password";

/// Fixed message for every tenant access refusal.
pub const ACCESS_DENIED_MESSAGE: &str = "Access to this workspace is denied";

/// Error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Email or secret did not match an active identity.
    CredentialsInvalid,
    /// A uniqueness constraint was violated (email, active membership).
    AlreadyExists,
    /// The identity is authenticated but has no usable tenant.
    NoActiveTenant,
    /// The identity has no active membership in the requested tenant.
    AccessDenied,
    /// The presented token is past its expiry.
    TokenExpired,
    /// The presented token could not be decoded or its signature is invalid.
    TokenMalformed,
    /// No token was presented.
    TokenMissing,
    /// A token of the wrong kind was presented (refresh vs. access).
    TokenKindMismatch,
    /// The requested entity was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A database error occurred.
    Database,
    /// A cache error occurred.
    Cache,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

/// Transport-independent status classification of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    /// The caller must (re-)authenticate.
    Unauthorized,
    /// The caller is authenticated but not allowed.
    Forbidden,
    /// The request conflicts with existing state.
    Conflict,
    /// The addressed entity does not exist.
    NotFound,
    /// The request input is invalid.
    BadRequest,
    /// The failure is on the server side.
    Internal,
}

impl ErrorKind {
    /// Stable, externally visible code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CredentialsInvalid => "CREDENTIALS_INVALID",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::NoActiveTenant => "NO_ACTIVE_TENANT",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenMalformed => "TOKEN_MALFORMED",
            Self::TokenMissing => "TOKEN_MISSING",
            Self::TokenKindMismatch => "TOKEN_KIND_MISMATCH",
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION",
            Self::Database => "DATABASE",
            Self::Cache => "CACHE",
            Self::Configuration => "CONFIGURATION",
            Self::Serialization => "SERIALIZATION",
            Self::Internal => "INTERNAL",
        }
    }

    /// Status classification the transport layer translates.
    pub fn status(&self) -> StatusClass {
        match self {
            Self::CredentialsInvalid
            | Self::NoActiveTenant
            | Self::TokenExpired
            | Self::TokenMalformed
            | Self::TokenMissing
            | Self::TokenKindMismatch => StatusClass::Unauthorized,
            Self::AccessDenied => StatusClass::Forbidden,
            Self::AlreadyExists => StatusClass::Conflict,
            Self::NotFound => StatusClass::NotFound,
            Self::Validation => StatusClass::BadRequest,
            Self::Database
            | Self::Cache
            | Self::Configuration
            | Self::Serialization
            | Self::Internal => StatusClass::Internal,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The unified application error used throughout Warden.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns `true` if this error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Status classification of this error.
    pub fn status(&self) -> StatusClass {
        self.kind.status()
    }

    /// Credential verification failed. The message never varies.
    pub fn credentials_invalid() -> Self {
        Self::new(ErrorKind::CredentialsInvalid, CREDENTIALS_INVALID_MESSAGE)
    }

    /// Tenant access refused. The message never varies.
    pub fn access_denied() -> Self {
        Self::new(ErrorKind::AccessDenied, ACCESS_DENIED_MESSAGE)
    }

    /// Create an already-exists (conflict) error.
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    /// The identity has no usable tenant.
    pub fn no_active_tenant() -> Self {
        Self::new(ErrorKind::NoActiveTenant, "No active workspace membership")
    }

    /// Create a token-expired error.
    pub fn token_expired() -> Self {
        Self::new(ErrorKind::TokenExpired, "Token has expired")
    }

    /// Create a token-malformed error.
    pub fn token_malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenMalformed, message)
    }

    /// Create a token-missing error.
    pub fn token_missing() -> Self {
        Self::new(ErrorKind::TokenMissing, "No token was presented")
    }

    /// Create a token-kind-mismatch error.
    pub fn token_kind_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenKindMismatch, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(
            ErrorKind::CredentialsInvalid.status(),
            StatusClass::Unauthorized
        );
        assert_eq!(ErrorKind::TokenKindMismatch.status(), StatusClass::Unauthorized);
        assert_eq!(ErrorKind::NoActiveTenant.status(), StatusClass::Unauthorized);
        assert_eq!(ErrorKind::AccessDenied.status(), StatusClass::Forbidden);
        assert_eq!(ErrorKind::AlreadyExists.status(), StatusClass::Conflict);
        assert_eq!(ErrorKind::NotFound.status(), StatusClass::NotFound);
        assert_eq!(ErrorKind::Cache.status(), StatusClass::Internal);
    }

    #[test]
    fn test_token_kinds_have_distinct_codes() {
        let codes = [
            ErrorKind::TokenExpired.code(),
            ErrorKind::TokenMalformed.code(),
            ErrorKind::TokenMissing.code(),
            ErrorKind::TokenKindMismatch.code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_fixed_messages() {
        assert_eq!(
            AppError::credentials_invalid().to_string(),
            "CREDENTIALS_INVALID: Invalid email or password"
        );
        assert_eq!(AppError::access_denied().message, ACCESS_DENIED_MESSAGE);
    }
}
