//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the business store (memory seed or PostgreSQL)
//! - Load industry templates and location pages
//! - Assemble the shared [`AppState`]
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{AppConfig, ConfigError, StoreBackend};
use crate::error::StoreError;
use crate::http::server::AppState;
use crate::industry::{TemplateError, TemplateRegistry};
use crate::site::location::LocationError;
use crate::site::{ConfigAssembler, ConfigCache, LocationCatalog, SiteService};
use crate::tenants::{BusinessStore, MemoryStore, PgStore, TenantLookup};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("business store: {0}")]
    Store(#[from] StoreError),

    #[error("industry templates: {0}")]
    Template(#[from] TemplateError),

    #[error("location pages: {0}")]
    Location(#[from] LocationError),

    #[error("listener: {0}")]
    Bind(#[from] std::io::Error),
}

/// Open the configured business store.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn BusinessStore>, StartupError> {
    match config.store.backend {
        StoreBackend::Memory => {
            let store = match &config.store.seed_file {
                Some(path) => MemoryStore::load_from_file(Path::new(path))?,
                None => {
                    tracing::warn!("Memory store has no seed file; every tenant will be not found");
                    MemoryStore::new()
                }
            };
            Ok(Arc::new(store))
        }
        StoreBackend::Postgres => {
            let store = PgStore::connect(&config.store).await?;
            if config.store.run_migrations {
                store.migrate().await?;
            }
            Ok(Arc::new(store))
        }
    }
}

/// Build the site service over an already-open store.
pub fn build_service(config: &AppConfig, store: Arc<dyn BusinessStore>) -> Result<SiteService, StartupError> {
    // 1. Templates: a broken template fails the boot
    let templates = Arc::new(TemplateRegistry::load()?);

    // 2. Location pages
    let locations = match &config.assembly.locations_dir {
        Some(dir) => LocationCatalog::load_from_dir(Path::new(dir))?,
        None => LocationCatalog::new(),
    };

    // 3. Cache
    let cache = config.assembly.cache_enabled.then(ConfigCache::new);

    tracing::info!(
        templates = templates.len(),
        location_pages = locations.len(),
        merge_strategy = ?config.assembly.merge_strategy,
        cache_enabled = config.assembly.cache_enabled,
        "Site service ready"
    );

    Ok(SiteService::new(
        TenantLookup::new(store),
        ConfigAssembler::new(templates, config.assembly.merge_strategy),
        Arc::new(locations),
        cache,
    ))
}

/// Everything the listeners need, from a validated config.
pub async fn build_state(config: Arc<AppConfig>) -> Result<AppState, StartupError> {
    let store = open_store(&config).await?;
    let service = build_service(&config, store)?;
    Ok(AppState::new(config, service))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::MergeStrategy;

    #[tokio::test]
    async fn test_build_state_with_defaults() {
        let state = build_state(Arc::new(AppConfig::default())).await.unwrap();
        assert!(state.service.cache().is_some());
        assert!(state.slug_override.is_none());
    }

    #[tokio::test]
    async fn test_demo_config_boots() {
        let config = crate::config::load_config(Path::new("demos/tenant-site.toml")).unwrap();
        let state = build_state(Arc::new(config)).await.unwrap();

        assert_eq!(state.service.locations().len(), 1);
        assert!(state.slug_override.is_some());
        let config = state.service.effective_config("jps", None).await.unwrap();
        assert_eq!(config.section("business").unwrap()["name"], "JP's Mobile Detailing");
    }

    #[tokio::test]
    async fn test_missing_seed_file_fails() {
        let mut config = AppConfig::default();
        config.store.seed_file = Some("/nonexistent/seed.json".into());
        let result = build_state(Arc::new(config)).await;
        assert!(matches!(result, Err(StartupError::Store(_))));
    }

    #[test]
    fn test_cache_can_be_disabled() {
        let mut config = AppConfig::default();
        config.assembly.cache_enabled = false;
        config.assembly.merge_strategy = MergeStrategy::Field;
        let service = build_service(&config, Arc::new(MemoryStore::new())).unwrap();
        assert!(service.cache().is_none());
    }
}
