//! Tenant slug validation.
//!
//! A slug is the URL-safe identifier of a tenant business and doubles as its
//! subdomain label, so it must be a valid DNS label as well.

/// Maximum length of a DNS label.
pub const MAX_SLUG_LEN: usize = 63;

/// Labels that belong to the platform itself and can never name a tenant.
pub const RESERVED_LABELS: &[&str] = &[
    "www", "api", "admin", "main", "main-site", "tenant", "staging", "dev",
    "cdn", "assets", "static", "img", "images", "media",
    "mail", "email", "ftp", "blog", "support", "help",
    "docs", "status", "monitoring", "metrics", "logs",
];

/// Returns true if `label` matches the slug pattern: lowercase ASCII
/// alphanumerics separated by single hyphens, 1 to 63 characters.
pub fn is_valid_slug(label: &str) -> bool {
    if label.is_empty() || label.len() > MAX_SLUG_LEN {
        return false;
    }
    if label.starts_with('-') || label.ends_with('-') || label.contains("--") {
        return false;
    }
    label
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Returns true if `label` is reserved for platform infrastructure.
pub fn is_reserved(label: &str) -> bool {
    RESERVED_LABELS.contains(&label)
}
