//! Tenant-scoped roles and the permission catalog.

pub mod model;
pub mod permission;

pub use model::{NewRole, Role, StandingRole};
pub use permission::{Permission, VIEWER_PERMISSIONS};
