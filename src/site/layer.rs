//! Configuration layers.
//!
//! A layer is a JSON object of top-level site sections. Three layers exist,
//! in increasing precedence: industry template, tenant, location.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::tenants::BusinessRecord;

/// Sections every template defines and that the merge treats specially.
pub const KNOWN_SECTIONS: [&str; 5] = ["hero", "seo", "services", "footer", "contact"];

/// Top-level key carrying tenant details derived from the business record.
pub const BUSINESS_SECTION: &str = "business";

/// Keys with this prefix are reserved for response metadata.
const RESERVED_PREFIX: char = '_';

/// Which layer a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerSource {
    Industry,
    Tenant,
    Location,
}

impl fmt::Display for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LayerSource::Industry => "industry",
            LayerSource::Tenant => "tenant",
            LayerSource::Location => "location",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotAnObject;

impl fmt::Display for NotAnObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("configuration layer must be a JSON object")
    }
}

impl std::error::Error for NotAnObject {}

/// One configuration layer: top-level section name → value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteLayer {
    sections: Map<String, Value>,
}

impl SiteLayer {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a layer from a JSON object. Reserved (`_`-prefixed) keys are
    /// dropped.
    pub fn from_value(value: Value) -> Result<Self, NotAnObject> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            _ => Err(NotAnObject),
        }
    }

    fn from_map(map: Map<String, Value>) -> Self {
        let sections = map
            .into_iter()
            .filter(|(k, _)| !k.starts_with(RESERVED_PREFIX))
            .collect();
        Self { sections }
    }

    /// The tenant layer for a business record.
    ///
    /// Stored `site_overrides` sections are taken as-is. A `business` section
    /// is derived from the record's contact fields unless the overrides
    /// already define one.
    pub fn from_record(record: &BusinessRecord) -> Self {
        let mut layer = match &record.site_overrides {
            Value::Object(map) => Self::from_map(map.clone()),
            Value::Null => Self::empty(),
            _ => {
                tracing::warn!(slug = %record.slug, "Ignoring non-object site_overrides");
                Self::empty()
            }
        };

        if !layer.sections.contains_key(BUSINESS_SECTION) {
            let mut business = Map::new();
            business.insert("name".into(), Value::String(record.business_name.clone()));
            if let Some(phone) = &record.business_phone {
                business.insert("phone".into(), Value::String(phone.clone()));
            }
            if let Some(email) = &record.business_email {
                business.insert("email".into(), Value::String(email.clone()));
            }
            if let Some(domain) = &record.custom_domain {
                business.insert("domain".into(), Value::String(domain.clone()));
            }
            if !record.service_areas.is_empty() {
                business.insert("serviceAreas".into(), Value::Array(record.service_areas.clone()));
            }
            layer.sections.insert(BUSINESS_SECTION.into(), Value::Object(business));
        }
        layer
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.sections.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if !key.starts_with(RESERVED_PREFIX) {
            self.sections.insert(key, value);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.sections.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.sections.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenants::ApplicationStatus;
    use chrono::Utc;
    use serde_json::json;

    fn record(overrides: Value) -> BusinessRecord {
        BusinessRecord {
            id: 3,
            slug: "jps".into(),
            business_name: "JP's Mobile Detailing".into(),
            industry: "mobile-detailing".into(),
            application_status: ApplicationStatus::Approved,
            owner: Some("JP".into()),
            business_email: None,
            business_phone: Some("(928) 555-1234".into()),
            service_areas: vec![json!({ "city": "Bullhead City", "state": "AZ" })],
            custom_domain: None,
            site_overrides: overrides,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_rejects_non_objects() {
        assert_eq!(SiteLayer::from_value(json!([1, 2])), Err(NotAnObject));
        assert_eq!(SiteLayer::from_value(json!("hero")), Err(NotAnObject));
    }

    #[test]
    fn test_reserved_keys_dropped() {
        let layer = SiteLayer::from_value(json!({ "_meta": 1, "hero": {} })).unwrap();
        assert!(!layer.contains("_meta"));
        assert!(layer.contains("hero"));
    }

    #[test]
    fn test_record_layer_derives_business() {
        let layer = SiteLayer::from_record(&record(json!({ "hero": { "title": "JP's" } })));
        assert_eq!(layer.get("hero"), Some(&json!({ "title": "JP's" })));
        assert_eq!(
            layer.get(BUSINESS_SECTION),
            Some(&json!({
                "name": "JP's Mobile Detailing",
                "phone": "(928) 555-1234",
                "serviceAreas": [{ "city": "Bullhead City", "state": "AZ" }]
            }))
        );
    }

    #[test]
    fn test_explicit_business_override_wins() {
        let layer = SiteLayer::from_record(&record(json!({ "business": { "name": "JPS" } })));
        assert_eq!(layer.get(BUSINESS_SECTION), Some(&json!({ "name": "JPS" })));
    }

    #[test]
    fn test_non_object_overrides_ignored() {
        let layer = SiteLayer::from_record(&record(json!("oops")));
        assert_eq!(layer.len(), 1);
        assert!(layer.contains(BUSINESS_SECTION));
    }
}
