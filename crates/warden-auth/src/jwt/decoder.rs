//! Stateless token validation.
//!
//! Validation touches no shared state: signature, expiry (with leeway),
//! issuer and the `typ` tag are all checked from the token alone.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::de::DeserializeOwned;
use tracing::debug;

use warden_core::config::AuthConfig;
use warden_core::error::AppError;

use super::claims::TokenKind;

/// Verifies HS256 tokens issued by [`JwtEncoder`](super::JwtEncoder).
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Create a decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        validation.set_issuer(&[config.jwt_issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Validate `token` as a token of `kind` and decode its claims.
    pub fn decode<T: DeserializeOwned>(&self, token: &str, kind: TokenKind) -> Result<T, AppError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::token_missing());
        }

        let data = decode::<serde_json::Value>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => AppError::token_expired(),
                _ => {
                    debug!(error = %e, "Token rejected");
                    AppError::token_malformed(format!("Invalid token: {e}"))
                }
            })?;

        let typ = data
            .claims
            .get("typ")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AppError::token_malformed("Token has no kind tag"))?;
        if typ != kind.as_str() {
            return Err(AppError::token_kind_mismatch(format!(
                "Expected {kind} token, got '{typ}'"
            )));
        }

        serde_json::from_value(data.claims)
            .map_err(|e| AppError::token_malformed(format!("Undecodable token claims: {e}")))
    }
}

/// Extract the credential from an `Authorization: Bearer …` value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AppError> {
    let value = header.map(str::trim).unwrap_or_default();
    let (scheme, credential) = value.split_once(' ').unwrap_or((value, ""));
    let credential = credential.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || credential.is_empty() {
        return Err(AppError::token_missing());
    }
    Ok(credential)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::ErrorKind;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(Some("bearer   xyz ")).unwrap(), "xyz");

        for header in [None, Some(""), Some("Bearer"), Some("Bearer  "), Some("Basic dXNlcg==")] {
            assert!(bearer_token(header).unwrap_err().is(ErrorKind::TokenMissing));
        }
    }
}
