//! Layer merging with provenance tracking.
//!
//! # Design Decisions
//! - Shallow merge: a higher layer replaces a top-level key wholesale
//! - `Field` strategy goes one level deeper, for known sections only
//! - `Deep` strategy recurses through every object; arrays follow per-key
//!   rules (concatenate, deduplicate, or replace)
//! - `null` never overwrites: a defined key can't become undefined
//! - Provenance is keyed by path (`hero`, `hero.title`, `hero.cta.label`)
//!   so every resolved value names exactly one winning layer. A combined
//!   array names the highest layer that contributed to it.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::site::layer::{LayerSource, SiteLayer, KNOWN_SECTIONS};

/// Granularity of overrides inside known sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Known sections are replaced wholesale.
    #[default]
    Section,
    /// Known object sections merge field by field.
    Field,
    /// Objects merge recursively at every depth, with array rules.
    Deep,
}

/// Arrays that accumulate across layers.
const CONCAT_KEYS: [&str; 4] = ["neighborhoods", "landmarks", "localConditions", "keywords"];

/// Arrays that accumulate with duplicates removed, first occurrence kept.
const DEDUPE_KEYS: [&str; 2] = ["images", "faqs"];

/// Objects a higher layer always replaces whole, even in `Deep` mode.
const WHOLESALE_KEYS: [&str; 5] = ["header", "reviewsSection", "ops", "serviceArea", "schemaOrg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayRule {
    Concat,
    Dedupe,
    Replace,
}

fn array_rule(key: &str) -> ArrayRule {
    if CONCAT_KEYS.contains(&key) {
        ArrayRule::Concat
    } else if DEDUPE_KEYS.contains(&key) {
        ArrayRule::Dedupe
    } else {
        ArrayRule::Replace
    }
}

/// Accumulates layers in precedence order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Merged {
    pub sections: Map<String, Value>,
    pub provenance: BTreeMap<String, LayerSource>,
}

impl Merged {
    /// Apply `layer` on top of everything merged so far.
    pub fn apply(&mut self, layer: &SiteLayer, source: LayerSource, strategy: MergeStrategy) {
        if strategy == MergeStrategy::Deep {
            let Merged { sections, provenance } = self;
            merge_deep(sections, layer.iter(), None, source, provenance);
            return;
        }

        for (key, value) in layer.iter() {
            if value.is_null() {
                continue;
            }

            let field_merge = strategy == MergeStrategy::Field
                && KNOWN_SECTIONS.contains(&key.as_str())
                && value.is_object();

            if field_merge {
                if let (Some(Value::Object(existing)), Value::Object(incoming)) =
                    (self.sections.get_mut(key), value)
                {
                    // Convert a wholesale entry into per-field entries first.
                    split_provenance(&mut self.provenance, key, existing);
                    for (field, v) in incoming {
                        if v.is_null() {
                            continue;
                        }
                        existing.insert(field.clone(), v.clone());
                        self.provenance.insert(field_path(key, field), source);
                    }
                    continue;
                }
            }

            clear_provenance(&mut self.provenance, key);
            self.sections.insert(key.clone(), value.clone());
            self.provenance.insert(key.clone(), source);
        }
    }
}

fn merge_deep<'a>(
    target: &mut Map<String, Value>,
    incoming: impl Iterator<Item = (&'a String, &'a Value)>,
    prefix: Option<&str>,
    source: LayerSource,
    provenance: &mut BTreeMap<String, LayerSource>,
) {
    for (key, value) in incoming {
        if value.is_null() {
            continue;
        }
        let path = match prefix {
            Some(prefix) => field_path(prefix, key),
            None => key.clone(),
        };

        if !WHOLESALE_KEYS.contains(&key.as_str()) {
            match (target.get_mut(key), value) {
                (Some(Value::Object(existing)), Value::Object(incoming)) => {
                    split_provenance(provenance, &path, existing);
                    merge_deep(existing, incoming.iter(), Some(&path), source, provenance);
                    continue;
                }
                (Some(Value::Array(existing)), Value::Array(incoming)) => {
                    let rule = array_rule(key);
                    if rule != ArrayRule::Replace {
                        existing.extend(incoming.iter().cloned());
                        if rule == ArrayRule::Dedupe {
                            dedupe(existing);
                        }
                        clear_provenance(provenance, &path);
                        provenance.insert(path, source);
                        continue;
                    }
                }
                _ => {}
            }
        }

        clear_provenance(provenance, &path);
        target.insert(key.clone(), value.clone());
        provenance.insert(path, source);
    }
}

/// Drop provenance for `path` and everything below it.
fn clear_provenance(provenance: &mut BTreeMap<String, LayerSource>, path: &str) {
    let prefix = format!("{path}.");
    provenance.retain(|p, _| p != path && !p.starts_with(&prefix));
}

/// Turn a single entry for the object at `path` into one per field.
fn split_provenance(
    provenance: &mut BTreeMap<String, LayerSource>,
    path: &str,
    object: &Map<String, Value>,
) {
    if let Some(previous) = provenance.remove(path) {
        for field in object.keys() {
            provenance.insert(field_path(path, field), previous);
        }
    }
}

fn field_path(section: &str, field: &str) -> String {
    format!("{section}.{field}")
}

/// Remove repeated items, keeping the first occurrence in order.
fn dedupe(items: &mut Vec<Value>) {
    let mut seen = HashSet::new();
    let mut index = 0;
    items.retain(|item| {
        let key = item_key(item, index);
        index += 1;
        seen.insert(key)
    });
}

/// Identity of an array item: image `role:url`, FAQ `id` or question,
/// the string itself, or an object's slug, title or name. Anything else is
/// unique by position.
fn item_key(item: &Value, index: usize) -> String {
    let field = |name: &str| item.get(name).filter(|v| is_set(v)).map(scalar_text);

    if let (Some(role), Some(url)) = (field("role"), field("url")) {
        return format!("image:{role}:{url}");
    }
    if let Some(id) = field("id") {
        return format!("faq:{id}");
    }
    if let Some(q) = field("q") {
        return format!("faq:{q}");
    }
    if let Value::String(s) = item {
        return format!("string:{s}");
    }
    if item.is_object() {
        if let Some(name) = field("slug").or_else(|| field("title")).or_else(|| field("name")) {
            return format!("object:{name}");
        }
    }
    format!("index:{index}")
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
