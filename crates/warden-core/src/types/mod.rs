//! Shared domain types.

pub mod id;

pub use id::{IdentityId, MembershipId, RoleId, TenantId};
