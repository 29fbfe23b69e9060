//! Location page overrides.
//!
//! Location pages (`/az/bullhead-city/`) carry city-specific hero and SEO
//! text. They are read from disk once at startup:
//!
//! ```text
//! <locations_dir>/<tenant-slug>/<state>/<city>.json
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::SiteError;
use crate::routing::slug::is_valid_slug;
use crate::site::layer::SiteLayer;

/// A `state/city` pair, e.g. `az/bullhead-city`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationKey {
    pub state: String,
    pub city: String,
}

impl LocationKey {
    pub fn new(state: &str, city: &str) -> Result<Self, SiteError> {
        let state = state.trim().to_ascii_lowercase();
        let city = city.trim().to_ascii_lowercase();
        if !is_valid_slug(&state) || !is_valid_slug(&city) {
            return Err(SiteError::InvalidLocation(format!("{state}/{city}")));
        }
        Ok(Self { state, city })
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.state, self.city)
    }
}

impl FromStr for LocationKey {
    type Err = SiteError;

    /// Accepts `state/city` with optional surrounding slashes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_matches('/');
        match trimmed.split_once('/') {
            Some((state, city)) if !city.contains('/') => Self::new(state, city),
            _ => Err(SiteError::InvalidLocation(s.to_string())),
        }
    }
}

/// Failures while reading location pages at startup.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} must contain a JSON object")]
    NotAnObject { path: String },
}

/// All location overrides, keyed by tenant slug and location.
#[derive(Debug, Clone, Default)]
pub struct LocationCatalog {
    pages: HashMap<String, BTreeMap<LocationKey, SiteLayer>>,
}

impl LocationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a location page for a tenant.
    pub fn insert(&mut self, slug: impl Into<String>, key: LocationKey, layer: SiteLayer) {
        self.pages.entry(slug.into()).or_default().insert(key, layer);
    }

    /// Load every `<slug>/<state>/<city>.json` below `dir`. Entries whose
    /// names are not valid slugs are skipped with a warning.
    pub fn load_from_dir(dir: &Path) -> Result<Self, LocationError> {
        let mut catalog = Self::new();

        for (slug, slug_path) in subdirectories(dir)? {
            for (state, state_path) in subdirectories(&slug_path)? {
                for entry in read_dir(&state_path)? {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) != Some("json") {
                        continue;
                    }
                    let Some(city) = path.file_stem().and_then(|s| s.to_str()) else {
                        continue;
                    };
                    let key = match LocationKey::new(&state, city) {
                        Ok(key) => key,
                        Err(_) => {
                            tracing::warn!(path = %path.display(), "Skipping location page with invalid name");
                            continue;
                        }
                    };

                    let display = path.display().to_string();
                    let content = fs::read_to_string(&path).map_err(|source| LocationError::Io {
                        path: display.clone(),
                        source,
                    })?;
                    let value: serde_json::Value = serde_json::from_str(&content)
                        .map_err(|source| LocationError::Parse { path: display.clone(), source })?;
                    let layer = SiteLayer::from_value(value)
                        .map_err(|_| LocationError::NotAnObject { path: display })?;

                    catalog.insert(slug.clone(), key, layer);
                }
            }
        }

        tracing::info!(dir = %dir.display(), pages = catalog.len(), "Loaded location pages");
        Ok(catalog)
    }

    /// The override layer for a tenant's location page.
    pub fn get(&self, slug: &str, key: &LocationKey) -> Option<&SiteLayer> {
        self.pages.get(slug)?.get(key)
    }

    /// All location keys a tenant has pages for, in order.
    pub fn locations(&self, slug: &str) -> Vec<&LocationKey> {
        self.pages
            .get(slug)
            .map(|pages| pages.keys().collect())
            .unwrap_or_default()
    }

    /// Total number of pages across tenants.
    pub fn len(&self) -> usize {
        self.pages.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn read_dir(dir: &Path) -> Result<Vec<fs::DirEntry>, LocationError> {
    let io_err = |source| LocationError::Io {
        path: dir.display().to_string(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(io_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

/// Subdirectories of `dir` whose names are valid slugs.
fn subdirectories(dir: &Path) -> Result<Vec<(String, std::path::PathBuf)>, LocationError> {
    let mut dirs = Vec::new();
    for entry in read_dir(dir)? {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) if is_valid_slug(name) => dirs.push((name.to_string(), path)),
            _ => tracing::warn!(path = %path.display(), "Skipping directory with invalid name"),
        }
    }
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_location_key() {
        let key: LocationKey = "az/bullhead-city".parse().unwrap();
        assert_eq!(key, LocationKey { state: "az".into(), city: "bullhead-city".into() });
        assert_eq!(key.to_string(), "az/bullhead-city");

        let key: LocationKey = "/AZ/Bullhead-City/".parse().unwrap();
        assert_eq!(key.to_string(), "az/bullhead-city");

        for bad in ["", "az", "az/", "/city", "az/bullhead city", "az/b/c", "../etc/passwd"] {
            assert!(bad.parse::<LocationKey>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = dir.path().join("jps").join("az");
        fs::create_dir_all(&state_dir).unwrap();
        fs::write(
            state_dir.join("bullhead-city.json"),
            json!({ "hero": { "title": "Mobile Detailing in Bullhead City" } }).to_string(),
        )
        .unwrap();
        fs::write(state_dir.join("notes.txt"), "ignored").unwrap();
        fs::create_dir_all(dir.path().join("Bad_Slug")).unwrap();

        let catalog = LocationCatalog::load_from_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);

        let key: LocationKey = "az/bullhead-city".parse().unwrap();
        let layer = catalog.get("jps", &key).unwrap();
        assert_eq!(layer.get("hero").unwrap()["title"], "Mobile Detailing in Bullhead City");
        assert!(catalog.get("other", &key).is_none());
        assert_eq!(catalog.locations("jps"), vec![&key]);
    }

    #[test]
    fn test_load_rejects_non_object_pages() {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = dir.path().join("jps").join("nv");
        fs::create_dir_all(&state_dir).unwrap();
        fs::write(state_dir.join("laughlin.json"), "[1, 2]").unwrap();

        let result = LocationCatalog::load_from_dir(dir.path());
        assert!(matches!(result, Err(LocationError::NotAnObject { .. })));
    }

    #[test]
    fn test_missing_dir_is_io_error() {
        let result = LocationCatalog::load_from_dir(Path::new("/nonexistent/locations"));
        assert!(matches!(result, Err(LocationError::Io { .. })));
    }
}
