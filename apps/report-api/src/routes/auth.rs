//! User authentication endpoints.
//!
//! ## Flow
//! ```text
//! signup ──► user (inactive unless auto-activate) ──► admin activates
//! login  ──► session + token pair
//! refresh ──► new pair, same session
//! logout ──► session revoked (all tokens of the pair die)
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{
    check_session, hash_password, load_active_user, verify_login, AuthSession, AuthUser, Principal,
    TokenPair,
};
use crate::error::{ApiError, ApiResult};
use crate::routes::TenantSummary;
use crate::AppState;
use posreport_core::validation::{validate_display_name, validate_email, validate_password, validate_username};
use posreport_core::{PrincipalKind, User};
use posreport_db::NewUser;

#[derive(Debug, Deserialize, Serialize)]
pub struct SignupRequest {
    pub tenant_code: String,
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SignupResponse {
    pub user: User,
    /// `true` until an administrator activates the account
    pub requires_activation: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: User,
    pub tenant: TenantSummary,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MeResponse {
    pub user: User,
    pub tenant: TenantSummary,
}

/// `POST /api/auth/signup`
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    validate_username(&req.username)?;
    validate_password(&req.password)?;
    validate_email(req.email.as_deref())?;
    validate_display_name(req.display_name.as_deref())?;

    let code = req.tenant_code.trim();
    let tenant = state
        .master
        .tenants()
        .get_by_code(code)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Tenant not found: {}", code)))?;

    if !tenant.is_active {
        return Err(ApiError::Forbidden(format!("Tenant is inactive: {}", tenant.code)));
    }

    let password_hash = hash_password(&req.password)?;
    let is_active = state.config.auto_activate_signups;

    let user = state
        .master
        .users()
        .create(&NewUser {
            tenant_id: tenant.id.clone(),
            username: req.username,
            email: req.email,
            display_name: req.display_name,
            password_hash,
            is_active,
        })
        .await?;

    info!(
        user_id = %user.id,
        tenant_id = %tenant.id,
        username = %user.username,
        active = is_active,
        "User signed up"
    );

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user,
            requires_activation: !is_active,
        }),
    ))
}

/// `POST /api/auth/login`
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> ApiResult<Json<LoginResponse>> {
    let found = state.master.users().get_by_username(req.username.trim()).await?;

    if !verify_login(&req.password, found.as_ref().map(|u| u.password_hash.as_str())) {
        warn!(username = %req.username.trim(), "Login failed: bad credentials");
        return Err(ApiError::invalid_credentials());
    }
    let user = found.ok_or_else(ApiError::invalid_credentials)?;

    let (user, tenant) = load_active_user(&state, &user.id).await?;

    let session = state
        .master
        .sessions()
        .create(&user.id, PrincipalKind::User, state.config.refresh_ttl())
        .await?;
    state.master.users().touch_last_login(&user.id).await?;

    let tokens = state.jwt.issue_pair(&Principal::user(&user), &session.id)?;

    info!(
        user_id = %user.id,
        tenant_id = %tenant.id,
        session_id = %session.id,
        "User logged in"
    );

    Ok(Json(LoginResponse {
        tokens,
        tenant: TenantSummary::from(&tenant),
        user,
    }))
}

/// `POST /api/auth/refresh`. Works for users and super-admins.
pub async fn refresh(State(state): State<AppState>, Json(req): Json<RefreshRequest>) -> ApiResult<Json<TokenPair>> {
    let claims = state.jwt.validate_refresh_token(&req.refresh_token)?;
    check_session(&state, &claims).await?;

    let principal = match claims.kind {
        PrincipalKind::User => {
            let (user, _) = load_active_user(&state, &claims.sub).await?;
            Principal::user(&user)
        }
        PrincipalKind::SuperAdmin => {
            let admin = state
                .master
                .admins()
                .get_by_id(&claims.sub)
                .await?
                .ok_or_else(|| ApiError::Unauthenticated("Super-admin no longer exists".to_string()))?;
            Principal::admin(&admin)
        }
    };

    let tokens = state.jwt.issue_pair(&principal, &claims.sid)?;
    info!(principal_id = %principal.id, session_id = %claims.sid, "Token refreshed");
    Ok(Json(tokens))
}

/// `POST /api/auth/logout`
pub async fn logout(State(state): State<AppState>, auth: AuthSession) -> ApiResult<StatusCode> {
    state.master.sessions().revoke(&auth.claims.sid).await?;
    info!(principal_id = %auth.claims.sub, session_id = %auth.claims.sid, "Logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/auth/me`
pub async fn me(auth: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        tenant: TenantSummary::from(&auth.tenant),
        user: auth.user,
    })
}
