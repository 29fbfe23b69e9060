//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, tenant context)
//! - Bind server to listener
//! - Stop accepting on the shutdown broadcast

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::handlers::{get_site, get_tenant_config, health, resolve_site};
use crate::http::middleware::tenant_context_middleware;
use crate::http::request::UuidRequestId;
use crate::routing::{FirstMatch, HostResolver};
use crate::site::SiteService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub resolver: Arc<HostResolver>,
    /// Present only when `resolver.allow_slug_override` is set.
    pub slug_override: Option<Arc<FirstMatch>>,
    pub service: SiteService,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, service: SiteService) -> Self {
        let resolver = Arc::new(HostResolver::from_config(&config.resolver));
        let slug_override = config.resolver.allow_slug_override.then(|| {
            tracing::warn!("Slug overrides enabled; do not use in production");
            Arc::new(FirstMatch::standard(
                &config.resolver.override_query_param,
                &config.resolver.override_path_prefix,
            ))
        });

        Self {
            config,
            resolver,
            slug_override,
            service,
        }
    }
}

/// HTTP server for the public site API.
pub struct HttpServer {
    router: Router,
    config: Arc<AppConfig>,
}

impl HttpServer {
    /// Create a new HTTP server over the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(state: AppState) -> Router {
        let config = state.config.clone();

        let mut router = Router::new()
            .route("/health", get(health))
            .route("/api/site/resolve", get(resolve_site))
            .route("/api/site", get(get_site))
            .route("/api/tenants/{slug}/config", get(get_tenant_config));

        // `/t/<slug>/api/site` mirrors the host-based routes in development.
        if config.resolver.allow_slug_override {
            let prefix = config.resolver.override_path_prefix.trim_matches('/');
            router = router
                .route(&format!("/{prefix}/{{slug}}/api/site/resolve"), get(resolve_site))
                .route(&format!("/{prefix}/{{slug}}/api/site"), get(get_site));
        }

        router
            .layer(middleware::from_fn_with_state(state.clone(), tenant_context_middleware))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    // The body limit sits outside the timeout: `Timeout` needs a
                    // response body with a `Default`, which the limit's wrapper lacks.
                    .layer(RequestBodyLimitLayer::new(config.listener.max_body_size))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server until the shutdown broadcast fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            base_domains = ?self.config.resolver.base_domains,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
