//! Identity (user account) entities.

pub mod model;

pub use model::{Identity, IdentityRemoval, IdentitySummary, NewIdentity};
