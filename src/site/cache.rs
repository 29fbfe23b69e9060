//! Effective-config cache.
//!
//! Entries are keyed strictly on `(industry, slug, location)` and stamped
//! with the tenant record's `updated_at`. A lookup that presents a different
//! `updated_at` discards the entry.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;

use crate::industry::Industry;
use crate::observability::metrics;
use crate::site::assembler::EffectiveConfig;
use crate::site::location::LocationKey;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub industry: Industry,
    pub slug: String,
    pub location: Option<LocationKey>,
}

#[derive(Debug, Clone)]
struct CachedConfig {
    updated_at: DateTime<Utc>,
    config: Arc<EffectiveConfig>,
}

/// Summary for the admin API.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CacheSummary {
    pub enabled: bool,
    pub entries: usize,
    pub tenants: usize,
}

/// A thread-safe cache of assembled configs.
#[derive(Clone, Default)]
pub struct ConfigCache {
    inner: Arc<DashMap<CacheKey, CachedConfig>>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached config if it was built from the same record version.
    pub fn get(&self, key: &CacheKey, updated_at: DateTime<Utc>) -> Option<Arc<EffectiveConfig>> {
        let stale = match self.inner.get(key) {
            Some(entry) if entry.updated_at == updated_at => {
                metrics::record_cache_lookup("hit");
                return Some(entry.config.clone());
            }
            Some(_) => true,
            None => false,
        };

        if stale {
            self.inner.remove(key);
            metrics::record_cache_lookup("stale");
            tracing::debug!(slug = %key.slug, "Discarded stale effective config");
        } else {
            metrics::record_cache_lookup("miss");
        }
        None
    }

    pub fn insert(&self, key: CacheKey, updated_at: DateTime<Utc>, config: Arc<EffectiveConfig>) {
        self.inner.insert(key, CachedConfig { updated_at, config });
        metrics::record_cache_size(self.inner.len());
    }

    /// Drop every entry for a tenant. Returns how many were removed.
    pub fn purge_slug(&self, slug: &str) -> usize {
        let before = self.inner.len();
        self.inner.retain(|k, _| k.slug != slug);
        let removed = before.saturating_sub(self.inner.len());
        metrics::record_cache_size(self.inner.len());
        removed
    }

    /// Drop everything. Returns how many entries were removed.
    pub fn clear(&self) -> usize {
        let removed = self.inner.len();
        self.inner.clear();
        metrics::record_cache_size(0);
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn summary(&self, enabled: bool) -> CacheSummary {
        let mut slugs: Vec<String> = self.inner.iter().map(|r| r.key().slug.clone()).collect();
        slugs.sort();
        slugs.dedup();
        CacheSummary {
            enabled,
            entries: self.inner.len(),
            tenants: slugs.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::industry::TemplateRegistry;
    use crate::site::assembler::ConfigAssembler;
    use crate::site::merge::MergeStrategy;
    use chrono::{Duration, TimeZone};

    fn config() -> Arc<EffectiveConfig> {
        let assembler = ConfigAssembler::new(Arc::new(TemplateRegistry::load().unwrap()), MergeStrategy::Section);
        Arc::new(assembler.assemble("lawncare", None, None).unwrap())
    }

    fn key(slug: &str, location: Option<&str>) -> CacheKey {
        CacheKey {
            industry: Industry::Lawncare,
            slug: slug.to_string(),
            location: location.map(|l| l.parse().unwrap()),
        }
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = ConfigCache::new();
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

        assert!(cache.get(&key("greens", None), ts).is_none());
        cache.insert(key("greens", None), ts, config());
        assert!(cache.get(&key("greens", None), ts).is_some());

        // Location is part of the key.
        assert!(cache.get(&key("greens", Some("az/kingman")), ts).is_none());
    }

    #[test]
    fn test_updated_at_change_invalidates() {
        let cache = ConfigCache::new();
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        cache.insert(key("greens", None), ts, config());

        assert!(cache.get(&key("greens", None), ts + Duration::seconds(1)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_purge_slug_and_clear() {
        let cache = ConfigCache::new();
        let ts = Utc::now();
        cache.insert(key("greens", None), ts, config());
        cache.insert(key("greens", Some("az/kingman")), ts, config());
        cache.insert(key("mowpros", None), ts, config());

        assert_eq!(cache.summary(true), CacheSummary { enabled: true, entries: 3, tenants: 2 });
        assert_eq!(cache.purge_slug("greens"), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.clear(), 1);
        assert!(cache.is_empty());
    }
}
