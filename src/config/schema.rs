//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::site::MergeStrategy;

/// Root configuration for the site service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Public listener (bind address, body limit).
    pub listener: ListenerConfig,

    /// Hostname resolution settings.
    pub resolver: ResolverConfig,

    /// Business record store.
    pub store: StoreConfig,

    /// Effective config assembly and caching.
    pub assembly: AssemblyConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_size: 64 * 1024,
        }
    }
}

/// Hostname resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Domains whose first subdomain label names a tenant.
    pub base_domains: Vec<String>,

    /// Accept an explicit slug from a header, query or path prefix.
    /// Intended for local development only.
    pub allow_slug_override: bool,

    /// Query parameter carrying an override slug.
    pub override_query_param: String,

    /// Path prefix carrying an override slug (`/t/<slug>/...`).
    pub override_path_prefix: String,

    /// Look up hosts outside every base domain as tenant custom domains.
    pub custom_domains: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_domains: vec!["thatsmartsite.com".to_string()],
            allow_slug_override: false,
            override_query_param: "tenant".to_string(),
            override_path_prefix: "t".to_string(),
            custom_domains: true,
        }
    }
}

/// Which store backend holds business records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
}

/// Business record store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// PostgreSQL connection string (postgres backend only).
    pub database_url: String,

    /// Pool size.
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection.
    pub acquire_timeout_secs: u64,

    /// JSON file of records loaded into the memory backend at startup.
    pub seed_file: Option<String>,

    /// Apply embedded migrations on startup.
    pub run_migrations: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            database_url: "postgres://localhost/tenant_site".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 3,
            seed_file: None,
            run_migrations: false,
        }
    }
}

/// Effective config assembly configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// `section` replaces whole sections, `field` merges known sections per field.
    pub merge_strategy: MergeStrategy,

    /// Cache assembled configs per tenant and location.
    pub cache_enabled: bool,

    /// Directory of `<slug>/<state>/<city>.json` location pages.
    pub locations_dir: Option<String>,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            merge_strategy: MergeStrategy::Section,
            cache_enabled: true,
            locations_dir: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Grace period for in-flight requests on shutdown, in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 10,
            shutdown_grace_secs: 15,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
