//! Identity ↔ tenant memberships.

pub mod model;
pub mod status;

pub use model::{Membership, NewMembership};
pub use status::MembershipStatus;
