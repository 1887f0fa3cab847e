//! # POS Report API Server
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Report API Server                                │
//! │                                                                         │
//! │  Browser ───► HTTP (8080) ───► Handlers ───► Master (SQLite)           │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │                          Tenant DB (SQLite / PostgreSQL)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use report_api::{build_router, ApiConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration before logging so its filter applies
    let config = ApiConfig::load().context("loading configuration")?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting POS Report API server...");
    info!(
        addr = %config.listen_addr(),
        master_db = %config.master_db_path.display(),
        tenant_dir = %config.tenant_data_dir.display(),
        auto_activate_signups = config.auto_activate_signups,
        "Configuration loaded"
    );

    let state = AppState::connect(config).await.context("opening master database")?;
    info!("Master database ready");

    if state.bootstrap_admin().await.context("bootstrapping super-admin")? {
        info!("Super-admin provisioned from configuration");
    }

    let purged = state.master.sessions().purge_expired().await?;
    if purged > 0 {
        info!(purged, "Removed stale sessions");
    }

    let listener = TcpListener::bind(state.config.listen_addr())
        .await
        .with_context(|| format!("binding {}", state.config.listen_addr()))?;
    info!(addr = %listener.local_addr()?, "Starting HTTP server");

    let app = build_router(state.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.tenants.close_all().await;
    state.master.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
