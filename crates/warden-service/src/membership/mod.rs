//! Membership resolution.

pub mod resolver;

pub use resolver::MembershipResolver;
