//! # warden-core
//!
//! Core crate for Warden. Contains the unified error system, configuration
//! schemas, typed identifiers, and the capability traits (cache, secret
//! hashing) that the other crates implement or consume.
//!
//! This crate has **no** internal dependencies on other Warden crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind, StatusClass};
pub use result::AppResult;
