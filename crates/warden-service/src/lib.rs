//! # warden-service
//!
//! Session and authorization services for Warden. Each service holds its
//! collaborators behind `Arc`s handed over at construction time; [`Services`]
//! wires the full graph from stores, a cache and a secret hasher.
//!
//! Every identity or membership read goes through the read-through cache, and
//! every mutation invalidates exactly the cache keys it affects.

pub mod credentials;
pub mod identity;
pub mod membership;
pub mod registry;
pub mod role;
pub mod session;
pub mod tenant;

pub use credentials::CredentialVerifier;
pub use identity::IdentityService;
pub use membership::MembershipResolver;
pub use registry::Services;
pub use role::RoleCatalog;
pub use session::{
    AuthSession, LogoutAck, RefreshedAccess, SessionOrchestrator, SignupRequest,
    WorkspaceSummary,
};
pub use tenant::TenantService;
