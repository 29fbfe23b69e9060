use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use tenant_site::admin::serve_admin;
use tenant_site::config::{load_or_default, ObservabilityConfig};
use tenant_site::lifecycle::{build_state, join_optional, log_exit, signals, Shutdown};
use tenant_site::observability::{logging, metrics};
use tenant_site::HttpServer;

#[derive(Parser)]
#[command(name = "tenant-site")]
#[command(about = "Multi-tenant site resolution service", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults are used when absent.
    #[arg(short, long, env = "SITE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 1. Configuration, then logging as configured
    let config = match load_or_default(args.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            logging::init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?args.config,
        bind_address = %config.listener.bind_address,
        store = ?config.store.backend,
        "tenant-site starting"
    );

    // 2. Metrics
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // 3. Store, templates, location pages
    let state = match build_state(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    // 4. Listeners last
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let admin_listener = if config.admin.enabled {
        Some(TcpListener::bind(&config.admin.bind_address).await?)
    } else {
        None
    };

    let shutdown = Shutdown::new();
    let mut stopped = shutdown.subscribe();

    let mut public = tokio::spawn(HttpServer::new(state.clone()).run(listener, shutdown.subscribe()));
    let mut admin = admin_listener.map(|l| tokio::spawn(serve_admin(l, state, shutdown.subscribe())));
    signals::spawn_signal_handler(&shutdown);

    // 5. Run until a signal, or until either server dies on its own
    tokio::select! {
        _ = stopped.recv() => {}
        result = &mut public => {
            log_exit("HTTP server", &result, false);
            shutdown.trigger();
            return Err("HTTP server exited unexpectedly".into());
        }
        result = join_optional(&mut admin) => {
            log_exit("Admin API", &result, false);
            shutdown.trigger();
            return Err("Admin API exited unexpectedly".into());
        }
    }

    let grace = Duration::from_secs(config.timeouts.shutdown_grace_secs);
    let drained = tokio::time::timeout(grace, async {
        log_exit("HTTP server", &public.await, true);
        if let Some(admin) = admin {
            log_exit("Admin API", &admin.await, true);
        }
    })
    .await;
    if drained.is_err() {
        tracing::warn!(grace_secs = grace.as_secs(), "Shutdown grace period elapsed");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
