//! Multi-tenant site resolution service.
//!
//! Turns an incoming request host into the site it addresses and, for tenant
//! sites, the effective configuration the page is rendered from.
//!
//! # Architecture Overview
//!
//! ```text
//!     Request (Host: jps.thatsmartsite.com)
//!         │
//!         ▼
//!   ┌──────────┐   SiteKind    ┌──────────┐  BusinessRecord  ┌──────────────┐
//!   │ routing  │──────────────▶│ tenants  │─────────────────▶│     site     │
//!   │ resolver │ main|admin|   │  lookup  │   (approved)     │  assembler   │
//!   └──────────┘ tenant{slug}  └────┬─────┘                  └──────┬───────┘
//!                                   │                               │
//!                            BusinessStore                 industry templates
//!                          (memory | postgres)             + location pages
//!                                                                   │
//!                                                                   ▼
//!                                                           EffectiveConfig
//!
//!   Cross-cutting: config, observability, lifecycle, admin API
//! ```

pub mod admin;
pub mod config;
pub mod error;
pub mod http;
pub mod industry;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod site;
pub mod tenants;

pub use config::AppConfig;
pub use error::{SiteError, SiteResult, StoreError};
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
pub use routing::{HostResolver, SiteKind};
pub use site::{ConfigAssembler, EffectiveConfig, SiteService};
