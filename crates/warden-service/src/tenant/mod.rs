//! Tenant (workspace) lifecycle.

pub mod service;

pub use service::TenantService;
