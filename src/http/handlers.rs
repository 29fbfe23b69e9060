//! Public API handlers.
//!
//! Thin layer over [`SiteService`](crate::site::SiteService): extract, call,
//! record the outcome, serialize.

use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;

use crate::error::{SiteError, SiteResult};
use crate::http::middleware::TenantContext;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::slug::is_valid_slug;
use crate::routing::SiteKind;
use crate::site::LocationKey;

#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    /// `state/city`, e.g. `az/bullhead-city`.
    pub location: Option<String>,
}

impl LocationQuery {
    /// Parse the location, treating an empty parameter as absent.
    pub fn key(&self) -> SiteResult<Option<LocationKey>> {
        self.location
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::parse)
            .transpose()
    }
}

pub async fn health() -> &'static str {
    "ok"
}

/// Which site the request host addresses, as the middleware resolved it.
pub async fn resolve_site(Extension(ctx): Extension<TenantContext>) -> Json<SiteKind> {
    Json(ctx.kind)
}

/// The effective config for the tenant addressed by the host, or the bare
/// kind for main and admin hosts.
pub async fn get_site(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<LocationQuery>,
) -> Result<Response, SiteError> {
    let start = Instant::now();
    let result = match &ctx.kind {
        SiteKind::Tenant { slug } => tenant_config(&state, slug, &query).await,
        other => Ok(Json(other).into_response()),
    };
    record(ctx.kind.as_str(), &result, start);
    result
}

/// The effective config for an explicitly named tenant.
pub async fn get_tenant_config(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<LocationQuery>,
) -> Result<Response, SiteError> {
    let start = Instant::now();
    let slug = slug.to_ascii_lowercase();
    let result = if is_valid_slug(&slug) {
        tenant_config(&state, &slug, &query).await
    } else {
        Err(SiteError::NotFound)
    };
    record("tenant", &result, start);
    result
}

async fn tenant_config(state: &AppState, slug: &str, query: &LocationQuery) -> SiteResult<Response> {
    let location = query.key()?;
    let config = state.service.effective_config(slug, location.as_ref()).await?;
    Ok(Json(&*config).into_response())
}

fn record(kind: &str, result: &SiteResult<Response>, start: Instant) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.outcome(),
    };
    metrics::record_request(kind, outcome, start);
}
