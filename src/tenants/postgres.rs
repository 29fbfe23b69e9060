//! PostgreSQL business store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::tenants::model::{ApplicationStatus, BusinessRecord};
use crate::tenants::store::BusinessStore;

const SELECT_COLUMNS: &str = "id, slug, business_name, industry, application_status, \
     owner, business_email, business_phone, \
     COALESCE(service_areas, '[]'::jsonb) AS service_areas, custom_domain, \
     COALESCE(site_overrides, '{}'::jsonb) AS site_overrides, \
     created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct BusinessRow {
    id: i64,
    slug: String,
    business_name: String,
    industry: String,
    application_status: String,
    owner: Option<String>,
    business_email: Option<String>,
    business_phone: Option<String>,
    service_areas: serde_json::Value,
    custom_domain: Option<String>,
    site_overrides: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BusinessRow> for BusinessRecord {
    fn from(row: BusinessRow) -> Self {
        let application_status = row.application_status.parse().unwrap_or_else(|e| {
            // Unknown states are never publicly visible.
            tracing::warn!(slug = %row.slug, error = %e, "Treating unknown application status as pending");
            ApplicationStatus::Pending
        });
        let service_areas = match row.service_areas {
            serde_json::Value::Array(items) => items,
            _ => Vec::new(),
        };

        BusinessRecord {
            id: row.id,
            slug: row.slug,
            business_name: row.business_name,
            industry: row.industry,
            application_status,
            owner: row.owner,
            business_email: row.business_email,
            business_phone: row.business_phone,
            service_areas,
            custom_domain: row.custom_domain,
            site_overrides: row.site_overrides,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Business store backed by the `tenants.business` table.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect a pool using the store configuration.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.database_url)
            .await?;
        tracing::info!(max_connections = config.max_connections, "Connected to business store");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.into()))?;
        tracing::info!("Business store migrations completed");
        Ok(())
    }
}

#[async_trait]
impl BusinessStore for PgStore {
    async fn get_by_slug(&self, slug: &str) -> Result<Option<BusinessRecord>, StoreError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM tenants.business WHERE slug = $1 LIMIT 1");
        let row: Option<BusinessRow> = sqlx::query_as(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(BusinessRecord::from))
    }

    async fn get_by_domain(&self, domain: &str) -> Result<Option<BusinessRecord>, StoreError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM tenants.business WHERE lower(custom_domain) = $1 LIMIT 1"
        );
        let row: Option<BusinessRow> = sqlx::query_as(&sql)
            .bind(domain)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(BusinessRecord::from))
    }

    async fn list(&self, status: Option<ApplicationStatus>) -> Result<Vec<BusinessRecord>, StoreError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM tenants.business \
             WHERE ($1::text IS NULL OR application_status = $1) ORDER BY slug"
        );
        let rows: Vec<BusinessRow> = sqlx::query_as(&sql)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(BusinessRecord::from).collect())
    }

    async fn set_status(
        &self,
        slug: &str,
        status: ApplicationStatus,
    ) -> Result<Option<BusinessRecord>, StoreError> {
        let sql = format!(
            "UPDATE tenants.business SET application_status = $2, updated_at = now() \
             WHERE slug = $1 RETURNING {SELECT_COLUMNS}"
        );
        let row: Option<BusinessRow> = sqlx::query_as(&sql)
            .bind(slug)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(BusinessRecord::from))
    }
}
