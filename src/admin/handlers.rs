use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::StoreBackend;
use crate::error::StoreError;
use crate::http::response::error_response;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::site::cache::CacheSummary;
use crate::site::MergeStrategy;
use crate::tenants::{ApplicationStatus, BusinessRecord};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("unknown application status `{0}`")]
    InvalidStatus(String),

    #[error("no business with slug `{0}`")]
    UnknownSlug(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        match &self {
            AdminError::InvalidStatus(_) => {
                error_response(StatusCode::BAD_REQUEST, "INVALID_STATUS", self.to_string())
            }
            AdminError::UnknownSlug(_) => {
                error_response(StatusCode::NOT_FOUND, "TENANT_NOT_FOUND", self.to_string())
            }
            AdminError::Store(e) => {
                tracing::error!(error = %e, "Business store unavailable");
                error_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "UPSTREAM_UNAVAILABLE",
                    "service temporarily unavailable",
                )
            }
        }
    }
}

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub store_backend: StoreBackend,
    pub merge_strategy: MergeStrategy,
    pub base_domains: Vec<String>,
    pub location_pages: usize,
    pub cache: CacheSummary,
}

/// Admin view of a business record.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TenantSummary {
    pub slug: String,
    pub business_name: String,
    pub industry: String,
    pub application_status: ApplicationStatus,
    pub updated_at: DateTime<Utc>,
}

impl From<BusinessRecord> for TenantSummary {
    fn from(r: BusinessRecord) -> Self {
        Self {
            slug: r.slug,
            business_name: r.business_name,
            industry: r.industry,
            application_status: r.application_status,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TenantsQuery {
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct PurgeResult {
    pub purged: usize,
}

fn cache_summary(state: &AppState) -> CacheSummary {
    match state.service.cache() {
        Some(cache) => cache.summary(true),
        None => CacheSummary {
            enabled: false,
            entries: 0,
            tenants: 0,
        },
    }
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        store_backend: state.config.store.backend,
        merge_strategy: state.config.assembly.merge_strategy,
        base_domains: state.config.resolver.base_domains.clone(),
        location_pages: state.service.locations().len(),
        cache: cache_summary(&state),
    })
}

pub async fn list_tenants(
    State(state): State<AppState>,
    Query(query): Query<TenantsQuery>,
) -> Result<Json<Vec<TenantSummary>>, AdminError> {
    let status = query
        .status
        .map(|s| s.parse::<ApplicationStatus>().map_err(|_| AdminError::InvalidStatus(s)))
        .transpose()?;

    let records = state.service.lookup().store().list(status).await?;
    Ok(Json(records.into_iter().map(TenantSummary::from).collect()))
}

pub async fn approve_tenant(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<TenantSummary>, AdminError> {
    set_status(&state, &slug, ApplicationStatus::Approved).await
}

pub async fn reject_tenant(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<TenantSummary>, AdminError> {
    set_status(&state, &slug, ApplicationStatus::Rejected).await
}

async fn set_status(
    state: &AppState,
    slug: &str,
    status: ApplicationStatus,
) -> Result<Json<TenantSummary>, AdminError> {
    let record = state
        .service
        .lookup()
        .store()
        .set_status(slug, status)
        .await?
        .ok_or_else(|| AdminError::UnknownSlug(slug.to_string()))?;

    // 1. Drop configs built while the tenant had its previous status
    let purged = state.service.cache().map_or(0, |c| c.purge_slug(slug));

    // 2. Record
    let action = match status {
        ApplicationStatus::Approved => "approve",
        ApplicationStatus::Rejected => "reject",
        ApplicationStatus::Pending => "reset",
    };
    metrics::record_admin_action(action);
    tracing::info!(slug = %slug, status = %status, purged, "Application status changed");

    Ok(Json(record.into()))
}

pub async fn get_cache(State(state): State<AppState>) -> Json<CacheSummary> {
    Json(cache_summary(&state))
}

pub async fn purge_cache(State(state): State<AppState>) -> Json<PurgeResult> {
    let purged = state.service.cache().map_or(0, |c| c.clear());
    metrics::record_admin_action("purge_cache");
    tracing::info!(purged, "Effective config cache purged");
    Json(PurgeResult { purged })
}
