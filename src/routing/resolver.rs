//! Hostname resolution.
//!
//! # Responsibilities
//! - Turn a `Host` header into a [`SiteKind`]: main site, admin app or tenant
//! - Treat `<label>.localhost` exactly like `<label>.<base-domain>`
//! - Degrade every malformed or unknown host to the main site
//!
//! # Design Decisions
//! - Pure function of (host, configured base domains); no I/O
//! - Base domains are compiled once at startup, immutable afterwards, and
//!   tried longest first so a nested base wins over its parent
//! - Only the first label is ever considered as a tenant candidate

use serde::{Deserialize, Serialize};

use crate::config::ResolverConfig;
use crate::routing::host::{normalize, NormalizedHost};
use crate::routing::slug::{is_reserved, is_valid_slug};

/// Label that marks a staging environment below a base domain.
const STAGING_LABEL: &str = "staging";

/// What kind of site a request is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SiteKind {
    /// Marketing site (apex, `www`, localhost, anything unrecognised).
    Main,
    /// Platform admin app.
    Admin,
    /// A tenant site, addressed by its slug.
    Tenant { slug: String },
}

impl SiteKind {
    /// Classify a single candidate label.
    pub fn from_label(label: &str) -> Self {
        match label {
            "admin" => SiteKind::Admin,
            "www" => SiteKind::Main,
            l if is_reserved(l) => SiteKind::Main,
            l if is_valid_slug(l) => SiteKind::Tenant { slug: l.to_string() },
            _ => SiteKind::Main,
        }
    }

    /// The tenant slug, if any.
    pub fn slug(&self) -> Option<&str> {
        match self {
            SiteKind::Tenant { slug } => Some(slug),
            _ => None,
        }
    }

    /// Metric/log label for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteKind::Main => "main",
            SiteKind::Admin => "admin",
            SiteKind::Tenant { .. } => "tenant",
        }
    }
}

/// Resolves request hosts against the configured production domains.
#[derive(Debug, Clone)]
pub struct HostResolver {
    /// Base domains split into labels, e.g. `["thatsmartsite", "com"]`.
    base_domains: Vec<Vec<String>>,
}

impl HostResolver {
    /// Create a resolver for the given base domains.
    pub fn new<I, S>(base_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut base_domains: Vec<Vec<String>> = base_domains
            .into_iter()
            .filter_map(|d| match normalize(d.as_ref()) {
                NormalizedHost::Name(labels) => Some(labels),
                _ => None,
            })
            .collect();
        base_domains.sort_by(|a, b| b.len().cmp(&a.len()));
        Self { base_domains }
    }

    /// Build a resolver from configuration.
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(&config.base_domains)
    }

    /// Resolve a raw `Host` header value. Total: never fails.
    pub fn resolve(&self, host: &str) -> SiteKind {
        let labels = match normalize(host) {
            NormalizedHost::Name(labels) => labels,
            NormalizedHost::Literal | NormalizedHost::Invalid => return SiteKind::Main,
        };

        match self.subdomain_labels(&labels) {
            Some(sub) => match sub.first() {
                Some(first) => SiteKind::from_label(first),
                None => SiteKind::Main,
            },
            None => SiteKind::Main,
        }
    }

    /// Labels in front of the recognised domain, or `None` for an apex.
    fn subdomain_labels<'a>(&self, labels: &'a [String]) -> Option<&'a [String]> {
        // <label>.localhost behaves like <label>.<base-domain>
        if labels.last().map(String::as_str) == Some("localhost") {
            let sub = &labels[..labels.len() - 1];
            return (!sub.is_empty()).then_some(sub);
        }

        for base in &self.base_domains {
            if labels.len() > base.len() && labels.ends_with(base) {
                let sub = &labels[..labels.len() - base.len()];
                // <slug>.staging.<base> → <slug>
                if sub.len() >= 2 && sub[sub.len() - 1] == STAGING_LABEL {
                    return Some(&sub[..sub.len() - 1]);
                }
                return Some(sub);
            }
            if labels == base.as_slice() {
                return None;
            }
        }

        // Unknown domain: two labels or fewer is an apex, otherwise the first
        // label is the candidate.
        if labels.len() > 2 {
            Some(&labels[..labels.len() - 2])
        } else {
            None
        }
    }

    /// The normalized host when it falls under no configured base domain
    /// and is not a `localhost` name: a candidate custom domain.
    pub fn custom_domain(&self, host: &str) -> Option<String> {
        let labels = match normalize(host) {
            NormalizedHost::Name(labels) => labels,
            NormalizedHost::Literal | NormalizedHost::Invalid => return None,
        };
        if labels.len() < 2 || labels.last().map(String::as_str) == Some("localhost") {
            return None;
        }
        let under_base = self
            .base_domains
            .iter()
            .any(|base| labels.len() >= base.len() && labels.ends_with(base));
        (!under_base).then(|| labels.join("."))
    }
}

impl Default for HostResolver {
    fn default() -> Self {
        Self::from_config(&ResolverConfig::default())
    }
}
