//! Business store collaborator and its in-memory implementation.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::error::StoreError;
use crate::tenants::model::{ApplicationStatus, BusinessRecord};

/// Query interface over the business-record table.
#[async_trait]
pub trait BusinessStore: Send + Sync {
    /// Point lookup on the unique slug.
    async fn get_by_slug(&self, slug: &str) -> Result<Option<BusinessRecord>, StoreError>;

    /// Point lookup on a tenant's custom domain (already lowercase).
    async fn get_by_domain(&self, domain: &str) -> Result<Option<BusinessRecord>, StoreError>;

    /// All records, optionally filtered by status, ordered by slug.
    async fn list(&self, status: Option<ApplicationStatus>) -> Result<Vec<BusinessRecord>, StoreError>;

    /// Change a record's status and bump `updated_at`.
    /// Returns the updated record, or `None` if the slug is unknown.
    async fn set_status(
        &self,
        slug: &str,
        status: ApplicationStatus,
    ) -> Result<Option<BusinessRecord>, StoreError>;
}

/// A thread-safe in-memory store, seedable from a JSON file.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, BusinessRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load records from a JSON array file.
    pub fn load_from_file(path: &Path) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        let records: Vec<BusinessRecord> = serde_json::from_reader(BufReader::new(file))?;

        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        tracing::info!(path = %path.display(), count = store.len(), "Loaded business records from seed file");
        Ok(store)
    }

    /// Insert or replace a record, keyed by slug.
    pub fn insert(&self, record: BusinessRecord) {
        self.inner.insert(record.slug.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl BusinessStore for MemoryStore {
    async fn get_by_slug(&self, slug: &str) -> Result<Option<BusinessRecord>, StoreError> {
        Ok(self.inner.get(slug).map(|r| r.value().clone()))
    }

    async fn get_by_domain(&self, domain: &str) -> Result<Option<BusinessRecord>, StoreError> {
        Ok(self
            .inner
            .iter()
            .find(|r| {
                r.value()
                    .custom_domain
                    .as_deref()
                    .is_some_and(|d| d.eq_ignore_ascii_case(domain))
            })
            .map(|r| r.value().clone()))
    }

    async fn list(&self, status: Option<ApplicationStatus>) -> Result<Vec<BusinessRecord>, StoreError> {
        let mut records: Vec<BusinessRecord> = self
            .inner
            .iter()
            .filter(|r| status.map_or(true, |s| r.value().application_status == s))
            .map(|r| r.value().clone())
            .collect();
        records.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(records)
    }

    async fn set_status(
        &self,
        slug: &str,
        status: ApplicationStatus,
    ) -> Result<Option<BusinessRecord>, StoreError> {
        Ok(self.inner.get_mut(slug).map(|mut r| {
            let record = r.value_mut();
            record.application_status = status;
            record.updated_at = Utc::now();
            record.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    fn record(slug: &str, status: ApplicationStatus) -> BusinessRecord {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        BusinessRecord {
            id: 1,
            slug: slug.to_string(),
            business_name: slug.to_uppercase(),
            industry: "lawncare".to_string(),
            application_status: status,
            owner: None,
            business_email: None,
            business_phone: None,
            service_areas: Vec::new(),
            custom_domain: None,
            site_overrides: serde_json::json!({}),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[tokio::test]
    async fn test_get_and_list() {
        let store = MemoryStore::new();
        store.insert(record("b-lawn", ApplicationStatus::Pending));
        store.insert(record("a-lawn", ApplicationStatus::Approved));

        assert!(store.get_by_slug("a-lawn").await.unwrap().is_some());
        assert!(store.get_by_slug("missing").await.unwrap().is_none());

        let all = store.list(None).await.unwrap();
        let slugs: Vec<_> = all.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, ["a-lawn", "b-lawn"]);

        let pending = store.list(Some(ApplicationStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].slug, "b-lawn");
    }

    #[tokio::test]
    async fn test_get_by_domain() {
        let store = MemoryStore::new();
        let mut jps = record("jps", ApplicationStatus::Approved);
        jps.custom_domain = Some("JPSMobileDetailing.com".to_string());
        store.insert(jps);
        store.insert(record("b-lawn", ApplicationStatus::Approved));

        let found = store.get_by_domain("jpsmobiledetailing.com").await.unwrap();
        assert_eq!(found.map(|r| r.slug), Some("jps".to_string()));
        assert!(store.get_by_domain("b-lawn.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_status_bumps_updated_at() {
        let store = MemoryStore::new();
        let original = record("jps", ApplicationStatus::Pending);
        store.insert(original.clone());

        let updated = store
            .set_status("jps", ApplicationStatus::Approved)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.application_status, ApplicationStatus::Approved);
        assert!(updated.updated_at > original.updated_at);

        assert!(store.set_status("nobody", ApplicationStatus::Approved).await.unwrap().is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let records = vec![record("jps", ApplicationStatus::Approved)];
        file.write_all(serde_json::to_string(&records).unwrap().as_bytes()).unwrap();

        let store = MemoryStore::load_from_file(file.path()).unwrap();
        assert_eq!(store.len(), 1);

        let missing = MemoryStore::load_from_file(Path::new("/nonexistent/seed.json"));
        assert!(matches!(missing, Err(StoreError::Seed(_))));
    }
}
