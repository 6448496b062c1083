//! PostgreSQL implementations of the store traits.

pub mod identity;
pub mod membership;
pub mod role;
pub mod tenant;

pub use identity::IdentityRepository;
pub use membership::MembershipRepository;
pub use role::RoleRepository;
pub use tenant::TenantRepository;
