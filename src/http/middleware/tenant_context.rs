//! Tenant context middleware.
//! Resolves which site a request addresses and attaches it to the request.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};

use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::{SiteKind, SlugSource};

/// How a request's [`SiteKind`] was decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolvedBy {
    /// Development slug override (header, query or path).
    Override,
    /// The whole host matched a tenant's custom domain.
    CustomDomain,
    /// Subdomain rules over the configured base domains.
    Host,
}

impl ResolvedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedBy::Override => "override",
            ResolvedBy::CustomDomain => "custom_domain",
            ResolvedBy::Host => "host",
        }
    }
}

/// Context attached to every public request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantContext {
    pub host: String,
    pub kind: SiteKind,
    pub resolved_by: ResolvedBy,
}

/// The host the client addressed: `Host` header, then the URI authority.
pub fn request_host(req: &Request<Body>) -> String {
    req.headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(|a| a.to_string()))
        .unwrap_or_default()
}

pub async fn tenant_context_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let host = request_host(&req);

    // 1. Development override, if enabled
    let override_slug = state
        .slug_override
        .as_ref()
        .and_then(|source| source.extract(&req));

    // 2. A custom domain, then 3. the subdomain rules
    let (kind, resolved_by) = match override_slug {
        Some(slug) => (SiteKind::from_label(&slug), ResolvedBy::Override),
        None => match custom_domain_slug(&state, &host).await {
            Some(slug) => (SiteKind::Tenant { slug }, ResolvedBy::CustomDomain),
            None => (state.resolver.resolve(&host), ResolvedBy::Host),
        },
    };
    metrics::record_resolve_duration(start);

    tracing::debug!(
        request_id = %request_id(req.headers()),
        host = %host,
        kind = kind.as_str(),
        slug = kind.slug().unwrap_or(""),
        resolved_by = resolved_by.as_str(),
        "Resolved site"
    );

    req.extensions_mut().insert(TenantContext {
        host,
        kind,
        resolved_by,
    });
    next.run(req).await
}

/// Slug of the public tenant owning `host` as a custom domain. Hidden or
/// unknown domains, and store failures, fall through to the subdomain rules.
async fn custom_domain_slug(state: &AppState, host: &str) -> Option<String> {
    if !state.config.resolver.custom_domains {
        return None;
    }
    let domain = state.resolver.custom_domain(host)?;
    state
        .service
        .lookup()
        .find_by_domain(&domain)
        .await
        .ok()
        .map(|record| record.slug)
}
