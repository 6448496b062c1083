//! # warden-cache
//!
//! Cache providers for Warden and the read-through layer that keeps cached
//! identity and membership data coherent with the store.
//!
//! - **memory**: in-process cache using [moka](https://crates.io/crates/moka)
//!   with per-entry expiry
//! - **redis**: Redis-backed cache using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime from configuration; services only
//! talk to [`ReadThroughCache`].

pub mod keys;
pub mod layer;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use layer::ReadThroughCache;
pub use provider::CacheManager;
