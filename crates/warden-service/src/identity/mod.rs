//! Identity reads and writes with cache coherence.

pub mod service;

pub use service::IdentityService;
