//! Tenant (workspace) entities.

pub mod model;
pub mod plan;
pub mod status;

pub use model::{NewTenant, Tenant, TenantSummary};
pub use plan::PlanTier;
pub use status::TenantStatus;
