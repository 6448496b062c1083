//! In-process implementation of every store trait.

pub mod state;
pub mod store;

pub use store::MemoryStore;
