//! Session orchestration: login, signup, refresh, tenant switch, logout.

pub mod model;
pub mod orchestrator;

pub use model::{AuthSession, LogoutAck, RefreshedAccess, SignupRequest, WorkspaceSummary};
pub use orchestrator::SessionOrchestrator;
