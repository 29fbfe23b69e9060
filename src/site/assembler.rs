//! Effective configuration assembly.
//!
//! # Responsibilities
//! - Resolve the industry template (unknown industry is an error, never a
//!   silent default)
//! - Merge tenant then location overrides on top
//! - Produce an [`EffectiveConfig`] that records which layer won each value
//!
//! # Design Decisions
//! - Deterministic: ordered maps, no clocks, no randomness
//! - Precedence is fixed: location > tenant > industry

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{SiteError, SiteResult};
use crate::industry::{Industry, TemplateRegistry};
use crate::site::layer::{LayerSource, SiteLayer};
use crate::site::merge::{MergeStrategy, Merged};

/// Metadata attached to an effective config.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigMeta {
    pub industry: Industry,
    pub provenance: BTreeMap<String, LayerSource>,
}

/// The merged configuration a tenant site is rendered from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveConfig {
    #[serde(flatten)]
    pub sections: Map<String, Value>,
    #[serde(rename = "_meta")]
    pub meta: ConfigMeta,
}

impl EffectiveConfig {
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.sections.get(name)
    }

    pub fn hero(&self) -> Option<&Value> {
        self.section("hero")
    }

    pub fn seo(&self) -> Option<&Value> {
        self.section("seo")
    }

    pub fn services(&self) -> Option<&Value> {
        self.section("services")
    }

    pub fn footer(&self) -> Option<&Value> {
        self.section("footer")
    }

    pub fn contact(&self) -> Option<&Value> {
        self.section("contact")
    }

    /// Which layer supplied the value at `path` (`hero`, `hero.title`,
    /// `hero.cta.label`).
    pub fn source_of(&self, path: &str) -> Option<LayerSource> {
        // A field inherits the provenance of the nearest wholesale ancestor.
        let mut current = path;
        loop {
            if let Some(source) = self.meta.provenance.get(current) {
                return Some(*source);
            }
            let (parent, _) = current.rsplit_once('.')?;
            current = parent;
        }
    }
}

/// Merges industry templates with tenant and location overrides.
#[derive(Debug, Clone)]
pub struct ConfigAssembler {
    templates: Arc<TemplateRegistry>,
    strategy: MergeStrategy,
}

impl ConfigAssembler {
    pub fn new(templates: Arc<TemplateRegistry>, strategy: MergeStrategy) -> Self {
        Self { templates, strategy }
    }

    pub fn strategy(&self) -> MergeStrategy {
        self.strategy
    }

    /// Parse an industry name, mapping unknown names to `ConfigNotFound`.
    pub fn industry(name: &str) -> SiteResult<Industry> {
        name.parse().map_err(|_| SiteError::ConfigNotFound {
            industry: name.to_string(),
        })
    }

    /// Assemble the effective config for an industry name.
    pub fn assemble(
        &self,
        industry: &str,
        tenant: Option<&SiteLayer>,
        location: Option<&SiteLayer>,
    ) -> SiteResult<EffectiveConfig> {
        let industry = Self::industry(industry)?;
        self.assemble_for(industry, tenant, location)
    }

    /// Assemble the effective config for an already-parsed industry.
    pub fn assemble_for(
        &self,
        industry: Industry,
        tenant: Option<&SiteLayer>,
        location: Option<&SiteLayer>,
    ) -> SiteResult<EffectiveConfig> {
        let template = self
            .templates
            .get(industry)
            .ok_or_else(|| SiteError::ConfigNotFound {
                industry: industry.to_string(),
            })?;

        let mut merged = Merged::default();
        merged.apply(template, LayerSource::Industry, self.strategy);
        if let Some(tenant) = tenant {
            merged.apply(tenant, LayerSource::Tenant, self.strategy);
        }
        if let Some(location) = location {
            merged.apply(location, LayerSource::Location, self.strategy);
        }

        Ok(EffectiveConfig {
            sections: merged.sections,
            meta: ConfigMeta {
                industry,
                provenance: merged.provenance,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::layer::KNOWN_SECTIONS;
    use serde_json::json;

    fn assembler(strategy: MergeStrategy) -> ConfigAssembler {
        ConfigAssembler::new(Arc::new(TemplateRegistry::load().unwrap()), strategy)
    }

    fn layer(value: Value) -> SiteLayer {
        SiteLayer::from_value(value).unwrap()
    }

    fn default_hero_title(industry: Industry) -> Value {
        let registry = TemplateRegistry::load().unwrap();
        registry.get(industry).unwrap().get("hero").unwrap()["title"].clone()
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = assembler(MergeStrategy::Section)
            .assemble("mobile-detailing", None, None)
            .unwrap();

        assert_eq!(config.meta.industry, Industry::MobileDetailing);
        assert_eq!(config.hero().unwrap()["title"], default_hero_title(Industry::MobileDetailing));
        for section in KNOWN_SECTIONS {
            assert!(config.section(section).is_some());
            assert_eq!(config.source_of(section), Some(LayerSource::Industry));
        }
    }

    #[test]
    fn test_tenant_without_hero_keeps_default_title() {
        let tenant = layer(json!({ "seo": { "title": "JP's Detailing" } }));
        let config = assembler(MergeStrategy::Section)
            .assemble("mobile-detailing", Some(&tenant), None)
            .unwrap();

        assert_eq!(config.hero().unwrap()["title"], default_hero_title(Industry::MobileDetailing));
        assert_eq!(config.seo().unwrap()["title"], "JP's Detailing");
        assert_eq!(config.source_of("seo.title"), Some(LayerSource::Tenant));
    }

    #[test]
    fn test_tenant_hero_override() {
        let tenant = layer(json!({ "hero": { "title": "JP's Mobile Detailing" } }));
        let config = assembler(MergeStrategy::Section)
            .assemble("mobile-detailing", Some(&tenant), None)
            .unwrap();

        assert_eq!(config.hero().unwrap(), &json!({ "title": "JP's Mobile Detailing" }));
        assert_eq!(config.source_of("hero.title"), Some(LayerSource::Tenant));
    }

    #[test]
    fn test_location_beats_tenant() {
        let tenant = layer(json!({
            "hero": { "title": "Tenant hero" },
            "footer": { "tagline": "Tenant footer" }
        }));
        let location = layer(json!({ "hero": { "title": "Bullhead City hero" } }));
        let config = assembler(MergeStrategy::Section)
            .assemble("mobile-detailing", Some(&tenant), Some(&location))
            .unwrap();

        assert_eq!(config.hero().unwrap()["title"], "Bullhead City hero");
        assert_eq!(config.footer().unwrap()["tagline"], "Tenant footer");
        assert_eq!(config.source_of("hero"), Some(LayerSource::Location));
        assert_eq!(config.source_of("footer"), Some(LayerSource::Tenant));
        assert_eq!(config.source_of("services"), Some(LayerSource::Industry));
    }

    #[test]
    fn test_precedence_law_over_many_keys() {
        let keys = ["hero", "seo", "services", "footer", "contact", "gallery", "faq"];
        for strategy in [MergeStrategy::Section, MergeStrategy::Field, MergeStrategy::Deep] {
            let a = assembler(strategy);
            for key in keys {
                let tenant = layer(json!({ key: { "title": "tenant" } }));
                let location = layer(json!({ key: { "title": "location" } }));
                let config = a.assemble("lawncare", Some(&tenant), Some(&location)).unwrap();
                assert_eq!(config.section(key).unwrap()["title"], "location", "{key} / {strategy:?}");
                assert_eq!(config.source_of(&format!("{key}.title")), Some(LayerSource::Location));
            }
        }
    }

    #[test]
    fn test_field_strategy_keeps_untouched_fields() {
        let tenant = layer(json!({ "hero": { "title": "JP's" } }));
        let config = assembler(MergeStrategy::Field)
            .assemble("mobile-detailing", Some(&tenant), None)
            .unwrap();

        let hero = config.hero().unwrap();
        assert_eq!(hero["title"], "JP's");
        assert_eq!(hero["cta"], "Book Now");
        assert_eq!(config.source_of("hero.title"), Some(LayerSource::Tenant));
        assert_eq!(config.source_of("hero.cta"), Some(LayerSource::Industry));
    }

    #[test]
    fn test_deep_strategy_location_keywords() {
        let tenant = layer(json!({ "seo": { "keywords": ["mobile detailing"] } }));
        let location = layer(json!({ "seo": { "keywords": ["bullhead city"] }, "hero": { "title": "Bullhead City" } }));
        let config = assembler(MergeStrategy::Deep)
            .assemble("mobile-detailing", Some(&tenant), Some(&location))
            .unwrap();

        // Template keywords, then tenant, then location.
        assert_eq!(
            config.seo().unwrap()["keywords"],
            json!([
                "mobile detailing",
                "car detailing",
                "ceramic coating",
                "paint protection film",
                "mobile detailing",
                "bullhead city"
            ])
        );
        assert!(config.seo().unwrap()["title"].is_string());
        assert_eq!(config.hero().unwrap()["title"], "Bullhead City");
        assert_eq!(config.hero().unwrap()["cta"], "Book Now");
        assert_eq!(config.source_of("seo.keywords"), Some(LayerSource::Location));
        assert_eq!(config.source_of("seo.title"), Some(LayerSource::Industry));
        assert_eq!(config.source_of("hero.cta"), Some(LayerSource::Industry));
        assert_eq!(config.source_of("services"), Some(LayerSource::Industry));
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let a = assembler(MergeStrategy::Section);
        let tenant = layer(json!({ "hero": { "title": "T" }, "extra": [1, 2, 3] }));
        let location = layer(json!({ "seo": { "title": "L" } }));

        let first = a.assemble("maid-service", Some(&tenant), Some(&location)).unwrap();
        let second = a.assemble("maid-service", Some(&tenant), Some(&location)).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_unknown_industry_is_config_not_found() {
        let err = assembler(MergeStrategy::Section)
            .assemble("pet-salon", None, None)
            .unwrap_err();
        match err {
            SiteError::ConfigNotFound { industry } => assert_eq!(industry, "pet-salon"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_serialized_shape() {
        let config = assembler(MergeStrategy::Section)
            .assemble("pet-grooming", None, None)
            .unwrap();
        let json = serde_json::to_value(&config).unwrap();

        for section in KNOWN_SECTIONS {
            assert!(json.get(section).is_some(), "missing {section}");
        }
        assert_eq!(json["_meta"]["industry"], "pet-grooming");
        assert_eq!(json["_meta"]["provenance"]["hero"], "industry");
    }
}
