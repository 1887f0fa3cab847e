//! Health check endpoint for load balancers and monitoring.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "serving" or "not_serving"
    pub status: String,
    pub version: String,
    pub master_db: bool,
    /// `None` when the migration table can't be read.
    pub master_migrations: Option<MigrationStatus>,
    pub cached_tenant_pools: usize,
    pub server_time: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MigrationStatus {
    pub total: usize,
    pub applied: usize,
}

/// `GET /health`. 503 when the master database can't be queried or has
/// migrations pending.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let master_ok = state.master.health_check().await;

    let migrations = match state.master.migration_status().await {
        Ok((total, applied)) => Some(MigrationStatus { total, applied }),
        Err(e) => {
            warn!(error = %e, "Health check: master migration status unavailable");
            None
        }
    };
    let migrated = migrations.as_ref().is_some_and(|m| m.applied >= m.total);

    let (status, text) = if master_ok && migrated {
        (StatusCode::OK, "serving")
    } else {
        warn!(master_ok, migrated, "Health check failed");
        (StatusCode::SERVICE_UNAVAILABLE, "not_serving")
    };

    let body = HealthResponse {
        status: text.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        master_db: master_ok,
        master_migrations: migrations,
        cached_tenant_pools: state.tenants.cached().await,
        server_time: Utc::now(),
    };
    (status, Json(body))
}
