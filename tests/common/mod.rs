//! Shared utilities for integration tests.
//!
//! Builds the public and admin routers over an in-memory store and drives
//! them in-process with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use tenant_site::admin::setup_admin_router;
use tenant_site::config::AppConfig;
use tenant_site::industry::TemplateRegistry;
use tenant_site::site::{ConfigAssembler, ConfigCache, LocationCatalog, LocationKey, SiteLayer, SiteService};
use tenant_site::tenants::{ApplicationStatus, BusinessRecord, MemoryStore, TenantLookup};
use tenant_site::{AppState, HttpServer};

pub const ADMIN_KEY: &str = "test-admin-key";

pub struct TestApp {
    pub public: Router,
    pub admin: Router,
    pub store: MemoryStore,
    pub state: AppState,
}

pub fn record(slug: &str, industry: &str, status: ApplicationStatus, overrides: Value) -> BusinessRecord {
    let ts = Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap();
    BusinessRecord {
        id: 0,
        slug: slug.to_string(),
        business_name: format!("{slug} business"),
        industry: industry.to_string(),
        application_status: status,
        owner: Some("owner@example.com".into()),
        business_email: Some(format!("hello@{slug}.example")),
        business_phone: Some("(928) 555-0100".into()),
        service_areas: vec![json!("Bullhead City, AZ"), json!("Laughlin, NV")],
        custom_domain: None,
        site_overrides: overrides,
        created_at: ts,
        updated_at: ts,
    }
}

/// Seed data:
/// - `jps`: approved mobile detailing with an SEO override, a location page
///   and the custom domain `jpsmobiledetailing.com`
/// - `greens`: approved lawncare without overrides
/// - `waiting`: pending maid service on `waitingmaids.com`
/// - `salon`: approved, but its industry has no template
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    let mut jps = record(
        "jps",
        "mobile-detailing",
        ApplicationStatus::Approved,
        json!({ "seo": { "title": "JP's Mobile Detailing | Bullhead City" } }),
    );
    jps.custom_domain = Some("jpsmobiledetailing.com".into());
    store.insert(jps);
    store.insert(record("greens", "lawncare", ApplicationStatus::Approved, json!({})));
    let mut waiting = record(
        "waiting",
        "maid-service",
        ApplicationStatus::Pending,
        json!({ "hero": { "title": "Not yet" } }),
    );
    waiting.custom_domain = Some("waitingmaids.com".into());
    store.insert(waiting);
    store.insert(record("salon", "pet-salon", ApplicationStatus::Approved, json!({})));
    store
}

pub fn locations() -> LocationCatalog {
    let mut catalog = LocationCatalog::new();
    catalog.insert(
        "jps",
        "az/bullhead-city".parse::<LocationKey>().unwrap(),
        SiteLayer::from_value(json!({
            "hero": { "title": "Mobile Detailing in Bullhead City" },
            "seo": { "title": "Bullhead City Detailing" }
        }))
        .unwrap(),
    );
    catalog
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.admin.enabled = true;
    config.admin.api_key = ADMIN_KEY.to_string();
    config
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(test_config())
}

pub fn spawn_app_with(config: AppConfig) -> TestApp {
    let store = seeded_store();
    let templates = Arc::new(TemplateRegistry::load().unwrap());
    let service = SiteService::new(
        TenantLookup::new(Arc::new(store.clone())),
        ConfigAssembler::new(templates, config.assembly.merge_strategy),
        Arc::new(locations()),
        config.assembly.cache_enabled.then(ConfigCache::new),
    );
    let state = AppState::new(Arc::new(config), service);

    TestApp {
        public: HttpServer::build_router(state.clone()),
        admin: setup_admin_router(state.clone()),
        store,
        state,
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

/// GET `uri` with the given `Host` header.
pub async fn get_host(router: &Router, host: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .header("host", host)
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

/// Call the admin API, with the test key unless `key` overrides it.
pub async fn admin(router: &Router, method: Method, uri: &str, key: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key.or(Some(ADMIN_KEY)).filter(|k| !k.is_empty()) {
        builder = builder.header("authorization", format!("Bearer {key}"));
    }
    send(router, builder.body(Body::empty()).unwrap()).await
}
