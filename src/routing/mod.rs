//! Routing subsystem: which site is this request for?
//!
//! # Data Flow
//! ```text
//! Host header
//!     → host.rs (strip port, lowercase, detect IP/localhost)
//!     → resolver.rs (base-domain / localhost / staging handling)
//!     → slug.rs (reserved labels, slug pattern)
//!     → SiteKind { main | admin | tenant(slug) }
//!
//! Dev mode only:
//!     matcher.rs (X-Tenant-Slug header, ?tenant=, /t/<slug>/)
//!     → overrides the host-derived SiteKind
//!
//! Hosts outside every base domain:
//!     resolver.rs custom_domain() → store lookup in the HTTP middleware
//! ```
//!
//! # Design Decisions
//! - Resolution is pure and total: malformed hosts degrade to `Main`
//! - No regex in the hot path
//! - Deterministic: same host always resolves to the same kind

pub mod host;
pub mod matcher;
pub mod resolver;
pub mod slug;

pub use matcher::{FirstMatch, SlugSource};
pub use resolver::{HostResolver, SiteKind};
