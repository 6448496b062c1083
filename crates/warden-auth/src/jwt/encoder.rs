//! Token signing.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::types::{IdentityId, TenantId};

use super::claims::{AccessClaims, AccessGrant, RefreshClaims, TokenKind};

/// A signed token and when it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    /// Compact JWS.
    pub token: String,
    /// Expiry.
    pub expires_at: DateTime<Utc>,
    /// Token id (`jti`).
    pub jti: Uuid,
}

/// Access and refresh token scoped to the same tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token.
    pub access: IssuedToken,
    /// Refresh token.
    pub refresh: IssuedToken,
}

/// Signs access and refresh tokens with HS256.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("issuer", &self.issuer)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Create an encoder from auth configuration.
    ///
    /// Fails with `Configuration` when a TTL does not fit a `chrono::Duration`.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let access_ttl = i64::try_from(config.access_ttl_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "access_ttl_minutes is out of range: {}",
                    config.access_ttl_minutes
                ))
            })?;
        let refresh_ttl = i64::try_from(config.refresh_ttl_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "refresh_ttl_hours is out of range: {}",
                    config.refresh_ttl_hours
                ))
            })?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            access_ttl,
            refresh_ttl,
        })
    }

    fn expiry(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, AppError> {
        now.checked_add_signed(ttl)
            .ok_or_else(|| AppError::configuration("Token lifetime exceeds the supported date range"))
    }

    /// Sign an access token for `grant`.
    pub fn access_token(&self, grant: AccessGrant) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let expires_at = Self::expiry(now, self.access_ttl)?;
        let claims = AccessClaims {
            grant,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
            typ: TokenKind::Access,
        };

        Ok(IssuedToken {
            token: self.sign(&claims)?,
            expires_at,
            jti: claims.jti,
        })
    }

    /// Sign a refresh token for an identity in a tenant.
    pub fn refresh_token(
        &self,
        identity_id: IdentityId,
        tenant_id: TenantId,
    ) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let expires_at = Self::expiry(now, self.refresh_ttl)?;
        let claims = RefreshClaims {
            sub: identity_id,
            tid: tenant_id,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
            typ: TokenKind::Refresh,
        };

        Ok(IssuedToken {
            token: self.sign(&claims)?,
            expires_at,
            jti: claims.jti,
        })
    }

    /// Sign an arbitrary claim set.
    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }
}
