//! Site configuration subsystem.
//!
//! # Data Flow
//! ```text
//! BusinessRecord
//!     → layer.rs (tenant layer from site_overrides + derived business info)
//! TemplateRegistry[industry]        LocationCatalog[slug][state/city]
//!     ↘                ↓                ↙
//!       merge.rs (industry < tenant < location, provenance)
//!     → assembler.rs (EffectiveConfig)
//!     → cache.rs (keyed on industry/slug/location, stamped with updated_at)
//! ```
//!
//! # Design Decisions
//! - Effective configs are derived, never persisted
//! - Identical inputs always produce identical output
//! - Section-level replacement by default; field-level is opt-in

pub mod assembler;
pub mod cache;
pub mod layer;
pub mod location;
pub mod merge;
pub mod service;

pub use assembler::{ConfigAssembler, EffectiveConfig};
pub use cache::ConfigCache;
pub use layer::{LayerSource, SiteLayer};
pub use location::{LocationCatalog, LocationKey};
pub use merge::MergeStrategy;
pub use service::SiteService;
