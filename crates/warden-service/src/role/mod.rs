//! Role and permission catalog.

pub mod catalog;

pub use catalog::RoleCatalog;
