//! Tenant subsystem.
//!
//! # Data Flow
//! ```text
//! slug
//!     → lookup.rs (single point lookup, visibility check)
//!     → store.rs (BusinessStore: MemoryStore | PgStore)
//!     → BusinessRecord (approved) | NotFound | UpstreamUnavailable
//! ```
//!
//! # Design Decisions
//! - Pending and rejected tenants look exactly like absent ones
//! - Records are never hard-deleted; rejection is a status change
//! - The store is chosen at startup and shared behind `Arc<dyn BusinessStore>`

pub mod lookup;
pub mod model;
pub mod postgres;
pub mod store;

pub use lookup::TenantLookup;
pub use model::{ApplicationStatus, BusinessRecord};
pub use postgres::PgStore;
pub use store::{BusinessStore, MemoryStore};
