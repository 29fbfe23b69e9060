//! Tenant lookup by slug.

use std::sync::Arc;

use crate::error::{SiteError, SiteResult, StoreError};
use crate::tenants::model::BusinessRecord;
use crate::tenants::store::BusinessStore;

/// Finds publicly visible tenants.
#[derive(Clone)]
pub struct TenantLookup {
    store: Arc<dyn BusinessStore>,
}

impl TenantLookup {
    pub fn new(store: Arc<dyn BusinessStore>) -> Self {
        Self { store }
    }

    /// The underlying store, for admin operations.
    pub fn store(&self) -> &Arc<dyn BusinessStore> {
        &self.store
    }

    /// One round trip to the store. Absent and unapproved tenants both yield
    /// [`SiteError::NotFound`]; store failures yield
    /// [`SiteError::UpstreamUnavailable`] and are not retried here.
    pub async fn find_by_slug(&self, slug: &str) -> SiteResult<BusinessRecord> {
        classify("slug", slug, self.store.get_by_slug(slug).await)
    }

    /// Same contract as [`find_by_slug`](Self::find_by_slug), keyed on a
    /// custom domain.
    pub async fn find_by_domain(&self, domain: &str) -> SiteResult<BusinessRecord> {
        classify("domain", domain, self.store.get_by_domain(domain).await)
    }
}

fn classify(
    by: &'static str,
    key: &str,
    result: Result<Option<BusinessRecord>, StoreError>,
) -> SiteResult<BusinessRecord> {
    match result {
        Ok(Some(record)) if record.is_public() => {
            tracing::debug!(by, key = %key, slug = %record.slug, tenant_id = record.id, "Tenant found");
            Ok(record)
        }
        Ok(Some(record)) => {
            tracing::info!(
                by,
                key = %key,
                slug = %record.slug,
                status = %record.application_status,
                "Tenant exists but is not publicly visible"
            );
            Err(SiteError::NotFound)
        }
        Ok(None) => {
            tracing::info!(by, key = %key, "Tenant not found");
            Err(SiteError::NotFound)
        }
        Err(e) => {
            tracing::error!(by, key = %key, error = %e, "Tenant lookup failed");
            Err(SiteError::UpstreamUnavailable(e))
        }
    }
}
