//! Error taxonomy for site resolution.
//!
//! `NotFound` deliberately covers both absent and unapproved tenants, and
//! `ConfigNotFound` renders the same body to clients so that neither leaks
//! whether a slug exists.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::http::response::error_response;

/// Failures of the business-record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("seed file error: {0}")]
    Seed(#[from] std::io::Error),

    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors surfaced to callers of the resolution pipeline.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("tenant not found")]
    NotFound,

    #[error("no template for industry `{industry}`")]
    ConfigNotFound { industry: String },

    #[error("business store unavailable: {0}")]
    UpstreamUnavailable(#[from] StoreError),

    #[error("malformed location key `{0}`")]
    InvalidLocation(String),

    #[error("no location page `{0}` for this tenant")]
    LocationNotFound(String),
}

pub type SiteResult<T> = Result<T, SiteError>;

impl SiteError {
    /// HTTP status and stable error code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            SiteError::NotFound | SiteError::ConfigNotFound { .. } => {
                (StatusCode::NOT_FOUND, "TENANT_NOT_FOUND")
            }
            SiteError::UpstreamUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "UPSTREAM_UNAVAILABLE")
            }
            SiteError::InvalidLocation(_) => (StatusCode::BAD_REQUEST, "INVALID_LOCATION"),
            SiteError::LocationNotFound(_) => (StatusCode::NOT_FOUND, "LOCATION_NOT_FOUND"),
        }
    }

    /// Metric label for this error.
    pub fn outcome(&self) -> &'static str {
        match self {
            SiteError::NotFound => "not_found",
            SiteError::ConfigNotFound { .. } => "config_not_found",
            SiteError::UpstreamUnavailable(_) => "upstream_unavailable",
            SiteError::InvalidLocation(_) => "invalid_location",
            SiteError::LocationNotFound(_) => "location_not_found",
        }
    }
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            SiteError::ConfigNotFound { industry } => {
                tracing::error!(industry = %industry, "Tenant references an industry with no template");
                SiteError::NotFound.to_string()
            }
            SiteError::UpstreamUnavailable(e) => {
                tracing::error!(error = %e, "Business store unavailable");
                "service temporarily unavailable".to_string()
            }
            other => other.to_string(),
        };

        error_response(status, code, message)
    }
}
