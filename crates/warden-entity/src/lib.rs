//! # warden-entity
//!
//! Domain entity models for Warden. Every struct in this crate represents a
//! database table row or a domain value object. Database entities derive
//! `sqlx::FromRow`; outward-facing summaries are produced by explicit `From`
//! mappings, never by reflection.

pub mod identity;
pub mod membership;
pub mod role;
pub mod tenant;
