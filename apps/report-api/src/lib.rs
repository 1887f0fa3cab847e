//! # POS Report API
//!
//! REST server behind the hosted reporting front end.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Report API Routes                              │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  /api/auth     │  │  /api/admin    │  │  /api/reports              ││
//! │  │                │  │                │  │                            ││
//! │  │ • signup       │  │ • login        │  │ • cash-book   • aging      ││
//! │  │ • login        │  │ • tenants      │  │ • ledger      • registers  ││
//! │  │ • refresh      │  │ • initialize   │  │ • trial-balance            ││
//! │  │ • logout / me  │  │ • users        │  │ • stock-summary            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │                                                                   │  │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐│  │
//! │  │  │  MasterDb    │  │ TenantPools  │  │    JWT Auth              ││  │
//! │  │  │              │  │              │  │                          ││  │
//! │  │  │ tenants,     │  │ AnyPool per  │  │ access/refresh tokens    ││  │
//! │  │  │ users,       │  │ tenant       │  │ bound to sessions        ││  │
//! │  │  │ sessions     │  │              │  │                          ││  │
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`]; every field can be set with a `POSREPORT_`
//! environment variable, e.g. `POSREPORT_JWT_SECRET`.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

use posreport_db::{MasterDb, MasterDbConfig, TenantPoolConfig, TenantPools};

// Re-exports
pub use auth::JwtManager;
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};

/// Shared application state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub master: MasterDb,
    pub tenants: TenantPools,
    pub jwt: Arc<JwtManager>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// Assembles state from already-opened databases.
    pub fn new(master: MasterDb, tenants: TenantPools, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(
            &config.jwt_secret,
            config.jwt_access_lifetime_secs,
            config.jwt_refresh_lifetime_secs,
        );

        AppState {
            master,
            tenants,
            jwt: Arc::new(jwt),
            config: Arc::new(config),
        }
    }

    /// Opens the master database and the tenant pool cache described by `config`.
    pub async fn connect(config: ApiConfig) -> ApiResult<Self> {
        let mut dirs = vec![config.tenant_data_dir.as_path()];
        dirs.extend(config.master_db_path.parent());
        for dir in dirs {
            std::fs::create_dir_all(dir)
                .map_err(|e| ApiError::Internal(format!("Cannot create {}: {}", dir.display(), e)))?;
        }

        let master = MasterDb::new(MasterDbConfig::new(&config.master_db_path)).await?;
        let tenants = TenantPools::new(
            TenantPoolConfig::new(&config.tenant_data_dir).max_connections(config.tenant_pool_size),
        );

        Ok(Self::new(master, tenants, config))
    }

    /// Creates the configured super-admin when the master has none.
    ///
    /// Returns `true` when an account was created.
    pub async fn bootstrap_admin(&self) -> ApiResult<bool> {
        let (Some(username), Some(password)) = (
            self.config.bootstrap_admin_username.as_deref(),
            self.config.bootstrap_admin_password.as_deref(),
        ) else {
            return Ok(false);
        };

        let admins = self.master.admins();
        if admins.count().await? > 0 {
            return Ok(false);
        }

        posreport_core::validation::validate_username(username)?;
        posreport_core::validation::validate_password(password)?;

        let hash = auth::hash_password(password)?;
        let admin = admins.create(username, &hash).await?;
        info!(admin_id = %admin.id, username = %admin.username, "Bootstrap super-admin created");
        Ok(true)
    }
}

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/logout", post(routes::auth::logout))
        .route("/me", get(routes::auth::me));

    let admin_routes = Router::new()
        .route("/login", post(routes::admin::login))
        .route("/tenants", get(routes::admin::list_tenants).post(routes::admin::create_tenant))
        .route("/tenants/{id}", patch(routes::admin::update_tenant))
        .route("/tenants/{id}/initialize", post(routes::admin::initialize_tenant))
        .route(
            "/tenants/{id}/users",
            get(routes::admin::list_users).post(routes::admin::create_user),
        )
        .route("/users/{id}", patch(routes::admin::update_user));

    let report_routes = Router::new()
        .route("/cash-book", get(routes::reports::cash_book))
        .route("/ledger/{account_id}", get(routes::reports::ledger))
        .route("/trial-balance", get(routes::reports::trial_balance))
        .route("/aging", get(routes::reports::aging))
        .route("/sales-register", get(routes::reports::sales_register))
        .route("/purchase-register", get(routes::reports::purchase_register))
        .route("/stock-summary", get(routes::reports::stock_summary));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .nest("/reports", report_routes)
        .route("/accounts", get(routes::catalog::accounts))
        .route("/parties", get(routes::catalog::parties))
        .route("/items", get(routes::catalog::items));

    let mut router = Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api", api);

    if let Some(dir) = &state.config.static_dir {
        info!(dir = %dir.display(), "Serving static front end");
        // Client-side routes fall back to the SPA entry point
        let index = ServeFile::new(dir.join("index.html"));
        router = router.fallback_service(ServeDir::new(dir).fallback(index));
    }

    router
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
