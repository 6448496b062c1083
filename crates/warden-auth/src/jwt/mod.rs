//! JWT issuance and validation.

pub mod claims;
pub mod decoder;
pub mod encoder;
pub mod service;

pub use claims::{AccessClaims, AccessGrant, RefreshClaims, TokenKind};
pub use decoder::{JwtDecoder, bearer_token};
pub use encoder::{IssuedToken, JwtEncoder, TokenPair};
pub use service::TokenService;
