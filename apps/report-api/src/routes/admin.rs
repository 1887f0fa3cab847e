//! Super-admin endpoints: login, tenant provisioning, user management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{hash_password, verify_login, AuthAdmin, Principal, TokenPair};
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use posreport_core::validation::{
    validate_connection_string, validate_display_name, validate_email, validate_name, validate_password,
    validate_tenant_code, validate_username,
};
use posreport_core::{DbProvider, PrincipalKind, SuperAdmin, Tenant, User};
use posreport_db::{NewTenant, NewUser, TenantUpdate};

#[derive(Debug, Deserialize, Serialize)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AdminLoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub admin: SuperAdmin,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateTenantRequest {
    pub code: String,
    pub name: String,
    pub db_provider: DbProvider,
    pub connection_string: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Run the tenant schema migrations right away
    #[serde(default)]
    pub initialize: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateTenantResponse {
    pub tenant: Tenant,
    pub initialized: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InitializeResponse {
    pub tenant_id: String,
    pub code: String,
    pub migrations: usize,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateUserRequest {
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

async fn find_tenant(state: &AppState, id: &str) -> ApiResult<Tenant> {
    state
        .master
        .tenants()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Tenant not found: {}", id)))
}

/// `POST /api/admin/login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<AdminLoginRequest>,
) -> ApiResult<Json<AdminLoginResponse>> {
    let found = state.master.admins().get_by_username(req.username.trim()).await?;

    if !verify_login(&req.password, found.as_ref().map(|a| a.password_hash.as_str())) {
        warn!(username = %req.username.trim(), "Super-admin login failed: bad credentials");
        return Err(ApiError::invalid_credentials());
    }
    let admin = found.ok_or_else(ApiError::invalid_credentials)?;

    let session = state
        .master
        .sessions()
        .create(&admin.id, PrincipalKind::SuperAdmin, state.config.refresh_ttl())
        .await?;
    let tokens = state.jwt.issue_pair(&Principal::admin(&admin), &session.id)?;

    info!(admin_id = %admin.id, session_id = %session.id, "Super-admin logged in");
    Ok(Json(AdminLoginResponse { tokens, admin }))
}

/// `GET /api/admin/tenants`
pub async fn list_tenants(State(state): State<AppState>, _admin: AuthAdmin) -> ApiResult<Json<Vec<Tenant>>> {
    Ok(Json(state.master.tenants().list().await?))
}

/// `POST /api/admin/tenants`
pub async fn create_tenant(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Json(req): Json<CreateTenantRequest>,
) -> ApiResult<(StatusCode, Json<CreateTenantResponse>)> {
    validate_tenant_code(&req.code)?;
    validate_name("name", &req.name)?;
    validate_connection_string(req.db_provider, &req.connection_string)?;

    let tenant = state
        .master
        .tenants()
        .create(&NewTenant {
            code: req.code,
            name: req.name,
            db_provider: req.db_provider,
            connection_string: req.connection_string,
            is_active: req.is_active,
        })
        .await?;

    info!(
        tenant_id = %tenant.id,
        code = %tenant.code,
        provider = %tenant.db_provider,
        admin_id = %admin.admin.id,
        "Tenant created"
    );

    // A tenant that asked for a schema and didn't get one is rolled back, so
    // the same request can be retried once the database is reachable.
    if req.initialize {
        if let Err(e) = state.tenants.initialize(&tenant).await {
            warn!(tenant_id = %tenant.id, error = %e, "Schema initialization failed, removing tenant");
            state.tenants.evict(&tenant.id).await;
            state.master.tenants().delete(&tenant.id).await?;
            return Err(e.into());
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(CreateTenantResponse {
            tenant,
            initialized: req.initialize,
        }),
    ))
}

/// `PATCH /api/admin/tenants/{id}`. Any cached pool is dropped.
pub async fn update_tenant(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<String>,
    Json(update): Json<TenantUpdate>,
) -> ApiResult<Json<Tenant>> {
    let existing = find_tenant(&state, &id).await?;

    if let Some(name) = &update.name {
        validate_name("name", name)?;
    }
    if update.db_provider.is_some() || update.connection_string.is_some() {
        let provider = update.db_provider.unwrap_or(existing.db_provider);
        let connection = update
            .connection_string
            .as_deref()
            .unwrap_or(&existing.connection_string);
        validate_connection_string(provider, connection)?;
    }

    let tenant = state.master.tenants().update(&id, &update).await?;
    let evicted = state.tenants.evict(&id).await;

    info!(
        tenant_id = %tenant.id,
        is_active = tenant.is_active,
        connection_changed = update.affects_connection(),
        evicted,
        admin_id = %admin.admin.id,
        "Tenant updated"
    );
    Ok(Json(tenant))
}

/// `POST /api/admin/tenants/{id}/initialize`
pub async fn initialize_tenant(
    State(state): State<AppState>,
    _admin: AuthAdmin,
    Path(id): Path<String>,
) -> ApiResult<Json<InitializeResponse>> {
    let tenant = find_tenant(&state, &id).await?;
    state.tenants.initialize(&tenant).await?;

    Ok(Json(InitializeResponse {
        tenant_id: tenant.id,
        code: tenant.code,
        migrations: posreport_db::migrations::tenant_migration_count(),
    }))
}

/// `GET /api/admin/tenants/{id}/users`
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AuthAdmin,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<User>>> {
    let tenant = find_tenant(&state, &id).await?;
    Ok(Json(state.master.users().list_by_tenant(&tenant.id).await?))
}

/// `POST /api/admin/tenants/{id}/users`. Provisioned users are active by default.
pub async fn create_user(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<String>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    validate_username(&req.username)?;
    validate_password(&req.password)?;
    validate_email(req.email.as_deref())?;
    validate_display_name(req.display_name.as_deref())?;

    let tenant = find_tenant(&state, &id).await?;
    let password_hash = hash_password(&req.password)?;

    let user = state
        .master
        .users()
        .create(&NewUser {
            tenant_id: tenant.id.clone(),
            username: req.username,
            email: req.email,
            display_name: req.display_name,
            password_hash,
            is_active: req.is_active,
        })
        .await?;

    info!(
        user_id = %user.id,
        tenant_id = %tenant.id,
        username = %user.username,
        admin_id = %admin.admin.id,
        "User provisioned"
    );
    Ok((StatusCode::CREATED, Json(user)))
}

/// `PATCH /api/admin/users/{id}`. Deactivation ends the user's sessions.
pub async fn update_user(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    let user = state.master.users().set_active(&id, req.is_active).await?;

    let revoked = if req.is_active {
        0
    } else {
        state
            .master
            .sessions()
            .revoke_all_for_principal(&user.id, PrincipalKind::User)
            .await?
    };

    info!(
        user_id = %user.id,
        is_active = user.is_active,
        sessions_revoked = revoked,
        admin_id = %admin.admin.id,
        "User updated"
    );
    Ok(Json(user))
}
