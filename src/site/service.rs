//! The resolution pipeline: slug → record → effective config.

use std::sync::Arc;

use crate::error::{SiteError, SiteResult};
use crate::site::assembler::{ConfigAssembler, EffectiveConfig};
use crate::site::cache::{CacheKey, ConfigCache};
use crate::site::layer::SiteLayer;
use crate::site::location::{LocationCatalog, LocationKey};
use crate::tenants::TenantLookup;

/// Ties tenant lookup, location pages, assembly and caching together.
#[derive(Clone)]
pub struct SiteService {
    lookup: TenantLookup,
    assembler: ConfigAssembler,
    locations: Arc<LocationCatalog>,
    cache: Option<ConfigCache>,
}

impl SiteService {
    pub fn new(
        lookup: TenantLookup,
        assembler: ConfigAssembler,
        locations: Arc<LocationCatalog>,
        cache: Option<ConfigCache>,
    ) -> Self {
        Self {
            lookup,
            assembler,
            locations,
            cache,
        }
    }

    pub fn lookup(&self) -> &TenantLookup {
        &self.lookup
    }

    pub fn cache(&self) -> Option<&ConfigCache> {
        self.cache.as_ref()
    }

    pub fn locations(&self) -> &LocationCatalog {
        &self.locations
    }

    /// Effective config for a public tenant, optionally for a location page.
    pub async fn effective_config(
        &self,
        slug: &str,
        location: Option<&LocationKey>,
    ) -> SiteResult<Arc<EffectiveConfig>> {
        // 1. Single store round trip
        let record = self.lookup.find_by_slug(slug).await?;

        // 2. Unknown industry fails loudly, before any cache access
        let industry = ConfigAssembler::industry(&record.industry)?;

        // 3. Location page must exist if one was asked for
        let location_layer = match location {
            Some(key) => Some(
                self.locations
                    .get(slug, key)
                    .ok_or_else(|| SiteError::LocationNotFound(key.to_string()))?,
            ),
            None => None,
        };

        let cache_key = CacheKey {
            industry,
            slug: slug.to_string(),
            location: location.cloned(),
        };
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&cache_key, record.updated_at) {
                return Ok(hit);
            }
        }

        // 4. Merge
        let tenant_layer = SiteLayer::from_record(&record);
        let config = Arc::new(self.assembler.assemble_for(
            industry,
            Some(&tenant_layer),
            location_layer,
        )?);

        if let Some(cache) = &self.cache {
            cache.insert(cache_key, record.updated_at, config.clone());
        }

        tracing::debug!(
            slug = %slug,
            industry = %industry,
            location = ?location.map(|l| l.to_string()),
            "Assembled effective config"
        );
        Ok(config)
    }
}
