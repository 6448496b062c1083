//! Capability traits defined in `warden-core` and implemented by other crates.

pub mod cache;
pub mod secret;

pub use cache::CacheProvider;
pub use secret::SecretHasher;
