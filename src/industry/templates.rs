//! Industry template registry.
//!
//! # Responsibilities
//! - Embed one JSON template per industry at compile time
//! - Parse and validate every template once, at startup
//! - Hand out read-only template layers by industry
//!
//! # Design Decisions
//! - Exhaustive `match` over [`Industry`]: a missing template is a build error
//! - A malformed template fails the boot, never a request
//! - Templates are immutable for the life of the process

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::industry::Industry;
use crate::site::layer::{SiteLayer, KNOWN_SECTIONS};

/// Startup failures while loading templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template for `{industry}` is not valid JSON: {source}")]
    Parse {
        industry: Industry,
        #[source]
        source: serde_json::Error,
    },

    #[error("template for `{industry}` must be a JSON object")]
    NotAnObject { industry: Industry },

    #[error("template for `{industry}` is missing section `{section}`")]
    MissingSection {
        industry: Industry,
        section: &'static str,
    },
}

/// Raw embedded template source for an industry.
pub fn raw_template(industry: Industry) -> &'static str {
    match industry {
        Industry::MobileDetailing => include_str!("../../templates/mobile-detailing.json"),
        Industry::MaidService => include_str!("../../templates/maid-service.json"),
        Industry::Lawncare => include_str!("../../templates/lawncare.json"),
        Industry::PetGrooming => include_str!("../../templates/pet-grooming.json"),
    }
}

/// Parsed, validated templates for every supported industry.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: HashMap<Industry, SiteLayer>,
}

impl TemplateRegistry {
    /// Parse and validate all embedded templates.
    pub fn load() -> Result<Self, TemplateError> {
        Self::load_with(raw_template)
    }

    /// Parse and validate templates from an arbitrary source.
    pub fn load_with<F>(source: F) -> Result<Self, TemplateError>
    where
        F: Fn(Industry) -> &'static str,
    {
        let mut templates = HashMap::with_capacity(Industry::ALL.len());

        for industry in Industry::ALL {
            let value: Value = serde_json::from_str(source(industry))
                .map_err(|source| TemplateError::Parse { industry, source })?;
            let layer = SiteLayer::from_value(value)
                .map_err(|_| TemplateError::NotAnObject { industry })?;

            for section in KNOWN_SECTIONS {
                match layer.get(section) {
                    Some(v) if !v.is_null() => {}
                    _ => return Err(TemplateError::MissingSection { industry, section }),
                }
            }

            tracing::debug!(industry = %industry, sections = layer.len(), "Loaded industry template");
            templates.insert(industry, layer);
        }

        Ok(Self { templates })
    }

    /// Template layer for a supported industry.
    pub fn get(&self, industry: Industry) -> Option<&SiteLayer> {
        self.templates.get(&industry)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_embedded_templates_load() {
        let registry = TemplateRegistry::load().unwrap();
        assert_eq!(registry.len(), Industry::ALL.len());
        for industry in Industry::ALL {
            let layer = registry.get(industry).unwrap();
            for section in KNOWN_SECTIONS {
                assert!(layer.contains(section), "{industry} lacks {section}");
            }
        }
    }

    #[test]
    fn test_missing_section_fails() {
        let result = TemplateRegistry::load_with(|industry| match industry {
            Industry::Lawncare => r#"{ "hero": {}, "seo": {}, "services": {}, "footer": {} }"#,
            other => raw_template(other),
        });
        assert!(matches!(
            result,
            Err(TemplateError::MissingSection { industry: Industry::Lawncare, section: "contact" })
        ));
    }

    #[test]
    fn test_malformed_template_fails() {
        let result = TemplateRegistry::load_with(|industry| match industry {
            Industry::PetGrooming => "{ not json",
            other => raw_template(other),
        });
        assert!(matches!(result, Err(TemplateError::Parse { industry: Industry::PetGrooming, .. })));

        let result = TemplateRegistry::load_with(|_| "[]");
        assert!(matches!(result, Err(TemplateError::NotAnObject { .. })));
    }
}
