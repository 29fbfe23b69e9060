//! Development slug overrides.
//!
//! # Responsibilities
//! - Extract an explicit tenant slug from a request (header, query, path)
//! - Combine several sources with first-match semantics
//!
//! # Design Decisions
//! - Overrides are validated with the same slug pattern as subdomains
//! - Invalid overrides are ignored, never an error
//! - Only wired in when `resolver.allow_slug_override` is set

use std::collections::HashMap;

use axum::body::Body;
use axum::extract::Query;
use axum::http::Request;

use crate::routing::slug::is_valid_slug;

/// Header naming the tenant explicitly.
pub const X_TENANT_SLUG: &str = "x-tenant-slug";

/// Trait for pulling an explicit tenant slug out of a request.
pub trait SlugSource: Send + Sync + std::fmt::Debug {
    /// Returns the slug named by this source, if present and valid.
    fn extract(&self, req: &Request<Body>) -> Option<String>;
}

/// Reads the `X-Tenant-Slug` header.
#[derive(Debug, Clone, Default)]
pub struct HeaderSlug;

impl SlugSource for HeaderSlug {
    fn extract(&self, req: &Request<Body>) -> Option<String> {
        req.headers()
            .get(X_TENANT_SLUG)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| is_valid_slug(s))
    }
}

/// Reads a query parameter such as `?tenant=jps`.
#[derive(Debug, Clone)]
pub struct QuerySlug {
    param: String,
}

impl QuerySlug {
    pub fn new(param: impl Into<String>) -> Self {
        Self { param: param.into() }
    }
}

impl SlugSource for QuerySlug {
    fn extract(&self, req: &Request<Body>) -> Option<String> {
        let Query(params) = Query::<HashMap<String, String>>::try_from_uri(req.uri()).ok()?;
        params
            .get(&self.param)
            .map(|value| value.trim().to_ascii_lowercase())
            .filter(|s| is_valid_slug(s))
    }
}

/// Reads the segment after a path prefix, e.g. `/t/jps/...`.
#[derive(Debug, Clone)]
pub struct PathSegmentSlug {
    prefix: String,
}

impl PathSegmentSlug {
    /// `prefix` is the leading segment without slashes, e.g. `t`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl SlugSource for PathSegmentSlug {
    fn extract(&self, req: &Request<Body>) -> Option<String> {
        let mut segments = req.uri().path().trim_start_matches('/').split('/');
        if segments.next()? != self.prefix {
            return None;
        }
        segments
            .next()
            .map(str::to_ascii_lowercase)
            .filter(|s| is_valid_slug(s))
    }
}

/// Tries several sources in order; the first valid slug wins.
#[derive(Debug)]
pub struct FirstMatch {
    sources: Vec<Box<dyn SlugSource>>,
}

impl FirstMatch {
    pub fn new(sources: Vec<Box<dyn SlugSource>>) -> Self {
        Self { sources }
    }

    /// Header, then query parameter, then path segment.
    pub fn standard(query_param: &str, path_prefix: &str) -> Self {
        Self::new(vec![
            Box::new(HeaderSlug),
            Box::new(QuerySlug::new(query_param)),
            Box::new(PathSegmentSlug::new(path_prefix)),
        ])
    }
}

impl SlugSource for FirstMatch {
    fn extract(&self, req: &Request<Body>) -> Option<String> {
        self.sources.iter().find_map(|s| s.extract(req))
    }
}
