//! Token service: the single entry point for issuing and validating tokens.

use tracing::debug;

use warden_core::config::AuthConfig;
use warden_core::result::AppResult;
use warden_core::types::{IdentityId, TenantId};

use super::claims::{AccessClaims, AccessGrant, RefreshClaims, TokenKind};
use super::decoder::JwtDecoder;
use super::encoder::{IssuedToken, JwtEncoder, TokenPair};

/// Issues and validates access and refresh tokens.
#[derive(Debug, Clone)]
pub struct TokenService {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
}

impl TokenService {
    /// Create a token service from auth configuration.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        Ok(Self {
            encoder: JwtEncoder::new(config)?,
            decoder: JwtDecoder::new(config),
        })
    }

    /// Issue an access token carrying `grant`.
    pub fn issue_access_token(&self, grant: AccessGrant) -> AppResult<IssuedToken> {
        debug!(
            identity_id = %grant.identity_id,
            tenant_id = %grant.tenant_id,
            role = %grant.role,
            "Issuing access token"
        );
        self.encoder.access_token(grant)
    }

    /// Issue a refresh token for an identity in a tenant.
    pub fn issue_refresh_token(
        &self,
        identity_id: IdentityId,
        tenant_id: TenantId,
    ) -> AppResult<IssuedToken> {
        debug!(%identity_id, %tenant_id, "Issuing refresh token");
        self.encoder.refresh_token(identity_id, tenant_id)
    }

    /// Issue an access + refresh pair scoped to the grant's tenant.
    pub fn issue_pair(&self, grant: AccessGrant) -> AppResult<TokenPair> {
        let refresh = self.issue_refresh_token(grant.identity_id, grant.tenant_id)?;
        let access = self.issue_access_token(grant)?;
        Ok(TokenPair { access, refresh })
    }

    /// Validate a token of the given kind, returning its raw claims.
    pub fn validate(&self, token: &str, kind: TokenKind) -> AppResult<serde_json::Value> {
        self.decoder.decode(token, kind)
    }

    /// Validate an access token.
    pub fn validate_access(&self, token: &str) -> AppResult<AccessClaims> {
        self.decoder.decode(token, TokenKind::Access)
    }

    /// Validate a refresh token.
    pub fn validate_refresh(&self, token: &str) -> AppResult<RefreshClaims> {
        self.decoder.decode(token, TokenKind::Refresh)
    }

    /// The underlying signer.
    pub fn encoder(&self) -> &JwtEncoder {
        &self.encoder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;
    use warden_core::ErrorKind;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret-with-enough-entropy".into(),
            leeway_seconds: 0,
            ..AuthConfig::default()
        }
    }

    fn grant() -> AccessGrant {
        AccessGrant {
            identity_id: IdentityId::new(),
            email: "ann@example.com".into(),
            name: "Ann".into(),
            tenant_id: TenantId::new(),
            role: "owner".into(),
            permissions: vec!["budget:read".into(), "budget:write".into()],
        }
    }

    #[test]
    fn test_access_claims_round_trip() {
        let tokens = TokenService::new(&config()).unwrap();
        let grant = grant();
        let issued = tokens.issue_access_token(grant.clone()).unwrap();

        let claims = tokens.validate_access(&issued.token).unwrap();
        assert_eq!(claims.grant, grant);
        assert_eq!(claims.typ, TokenKind::Access);
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_refresh_claims_carry_no_permissions() {
        let tokens = TokenService::new(&config()).unwrap();
        let grant = grant();
        let pair = tokens.issue_pair(grant.clone()).unwrap();

        let raw = tokens.validate(&pair.refresh.token, TokenKind::Refresh).unwrap();
        assert!(raw.get("perms").is_none());
        assert!(raw.get("role").is_none());

        let claims = tokens.validate_refresh(&pair.refresh.token).unwrap();
        assert_eq!(claims.sub, grant.identity_id);
        assert_eq!(claims.tid, grant.tenant_id);
        assert_eq!(claims.exp - claims.iat, 168 * 3600);
    }

    #[test]
    fn test_kind_mismatch_both_ways() {
        let tokens = TokenService::new(&config()).unwrap();
        let pair = tokens.issue_pair(grant()).unwrap();

        let err = tokens.validate_access(&pair.refresh.token).unwrap_err();
        assert!(err.is(ErrorKind::TokenKindMismatch));
        let err = tokens.validate_refresh(&pair.access.token).unwrap_err();
        assert!(err.is(ErrorKind::TokenKindMismatch));
    }

    #[test]
    fn test_expired_token() {
        let tokens = TokenService::new(&config()).unwrap();
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            grant: grant(),
            iss: "warden".into(),
            iat: now - 7200,
            exp: now - 3600,
            jti: Uuid::new_v4(),
            typ: TokenKind::Access,
        };
        let token = tokens.encoder().sign(&claims).unwrap();

        let err = tokens.validate_access(&token).unwrap_err();
        assert!(err.is(ErrorKind::TokenExpired));
    }

    #[test]
    fn test_malformed_and_missing() {
        let tokens = TokenService::new(&config()).unwrap();
        assert!(
            tokens
                .validate_access("not-a-token")
                .unwrap_err()
                .is(ErrorKind::TokenMalformed)
        );
        assert!(tokens.validate_access("  ").unwrap_err().is(ErrorKind::TokenMissing));

        let foreign = TokenService::new(&AuthConfig {
            jwt_secret: "another-secret".into(),
            ..config()
        })
        .unwrap();
        let issued = foreign.issue_access_token(grant()).unwrap();
        assert!(
            tokens
                .validate_access(&issued.token)
                .unwrap_err()
                .is(ErrorKind::TokenMalformed)
        );
    }

    #[test]
    fn test_undecodable_claims_are_malformed() {
        let tokens = TokenService::new(&config()).unwrap();
        let now = Utc::now().timestamp();
        let token = tokens
            .encoder()
            .sign(&serde_json::json!({
                "iss": "warden",
                "exp": now + 60,
                "typ": "access",
                "sub": "not-a-uuid",
            }))
            .unwrap();

        let err = tokens.validate_access(&token).unwrap_err();
        assert!(err.is(ErrorKind::TokenMalformed));
    }

    #[test]
    fn test_out_of_range_ttl_is_a_configuration_error() {
        let err = TokenService::new(&AuthConfig {
            access_ttl_minutes: u64::MAX,
            ..config()
        })
        .unwrap_err();
        assert!(err.is(ErrorKind::Configuration));

        let err = TokenService::new(&AuthConfig {
            refresh_ttl_hours: i64::MAX as u64,
            ..config()
        })
        .unwrap_err();
        assert!(err.is(ErrorKind::Configuration));

        // Representable as a duration, but past the last supported date
        let tokens = TokenService::new(&AuthConfig {
            refresh_ttl_hours: 3_000_000_000,
            ..config()
        })
        .unwrap();
        let err = tokens.issue_pair(grant()).unwrap_err();
        assert!(err.is(ErrorKind::Configuration));
    }
}
