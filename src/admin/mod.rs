//! Admin API: application review and cache control.
//!
//! Served on its own listener (`admin.bind_address`) and guarded by a bearer
//! token.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/tenants", get(list_tenants))
        .route("/admin/tenants/{slug}/approve", post(approve_tenant))
        .route("/admin/tenants/{slug}/reject", post(reject_tenant))
        .route("/admin/cache", get(get_cache).delete(purge_cache))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

/// Serve the admin API until the shutdown broadcast fires.
pub async fn serve_admin(
    listener: TcpListener,
    state: AppState,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    tracing::info!(address = %listener.local_addr()?, "Admin API starting");
    axum::serve(listener, setup_admin_router(state).layer(TraceLayer::new_for_http()))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;
    tracing::info!("Admin API stopped");
    Ok(())
}
