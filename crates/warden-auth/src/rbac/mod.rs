//! Permission checks on validated access tokens.

pub mod enforcer;

pub use enforcer::PermissionEnforcer;
