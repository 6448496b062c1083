//! # warden-database
//!
//! The system of record for Warden. [`store`] defines the capability traits
//! the services consume; [`repositories`] implements them over PostgreSQL and
//! [`memory`] implements them in process for tests and local tooling.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{IdentityStore, MembershipStore, RoleStore, Stores, TenantStore};
