//! # Authentication
//!
//! Password hashing, JWT issuance/validation and the request extractors that
//! guard every protected route.
//!
//! ## Token Model
//! ```text
//!   login ──► sessions row (lifetime = refresh TTL)
//!               ├──► access token  { sub, kind, tenant_id, sid, ... }
//!               └──► refresh token { same claims, token_type = refresh }
//!
//!   each request: signature + expiry ──► session active?
//!                 ──► principal active? (users: tenant too)
//! ```
//!
//! Logout and user deactivation revoke the session row, so a token stops
//! working on its next use even though its `exp` has not passed.

use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;
use posreport_core::{PrincipalKind, SuperAdmin, Tenant, User};

pub const ACCESS_TOKEN: &str = "access";
pub const REFRESH_TOKEN: &str = "refresh";

// =============================================================================
// Passwords
// =============================================================================

/// Hash a password with Argon2 and a random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored hash. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Checks a login attempt against the account's stored hash, if any.
///
/// Unknown usernames are verified against a fixed hash so both failure
/// paths pay the same argon2 cost and response time doesn't reveal which
/// usernames exist.
pub fn verify_login(password: &str, stored_hash: Option<&str>) -> bool {
    match stored_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            verify_password(password, dummy_hash());
            false
        }
    }
}

fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash_password("posreport-no-such-account").unwrap_or_default())
}

// =============================================================================
// JWT
// =============================================================================

/// Payload shared by access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user or super-admin id)
    pub sub: String,

    /// Principal kind of `sub`
    pub kind: PrincipalKind,

    /// Tenant ID (users only)
    pub tenant_id: Option<String>,

    /// Session the token belongs to
    pub sid: String,

    pub username: String,

    /// Unix seconds
    pub iat: i64,

    /// Unix seconds
    pub exp: i64,

    /// Fresh per token, so two tokens minted in the same second differ
    pub jti: String,

    /// [`ACCESS_TOKEN`] or [`REFRESH_TOKEN`]
    pub token_type: String,
}

/// Who a token is being issued for.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: String,
    pub kind: PrincipalKind,
    pub tenant_id: Option<String>,
    pub username: String,
}

impl Principal {
    pub fn user(user: &User) -> Self {
        Principal {
            id: user.id.clone(),
            kind: PrincipalKind::User,
            tenant_id: Some(user.tenant_id.clone()),
            username: user.username.clone(),
        }
    }

    pub fn admin(admin: &SuperAdmin) -> Self {
        Principal {
            id: admin.id.clone(),
            kind: PrincipalKind::SuperAdmin,
            tenant_id: None,
            username: admin.username.clone(),
        }
    }
}

/// Access/refresh pair returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Signs and checks HS256 tokens with the configured secret.
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_lifetime_secs: i64,
    refresh_lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: &str, access_lifetime_secs: i64, refresh_lifetime_secs: i64) -> Self {
        JwtManager {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_lifetime_secs,
            refresh_lifetime_secs,
        }
    }

    pub fn access_lifetime_secs(&self) -> i64 {
        self.access_lifetime_secs
    }

    fn generate(
        &self,
        principal: &Principal,
        session_id: &str,
        token_type: &str,
        lifetime_secs: i64,
    ) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(lifetime_secs);

        let claims = Claims {
            sub: principal.id.clone(),
            kind: principal.kind,
            tenant_id: principal.tenant_id.clone(),
            sid: session_id.to_string(),
            username: principal.username.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to generate {} token: {}", token_type, e)))
    }

    /// Short-lived token sent on every API call.
    pub fn generate_access_token(&self, principal: &Principal, session_id: &str) -> Result<String, ApiError> {
        self.generate(principal, session_id, ACCESS_TOKEN, self.access_lifetime_secs)
    }

    /// Long-lived token accepted only by `/api/auth/refresh`.
    pub fn generate_refresh_token(&self, principal: &Principal, session_id: &str) -> Result<String, ApiError> {
        self.generate(principal, session_id, REFRESH_TOKEN, self.refresh_lifetime_secs)
    }

    /// Both tokens for one session.
    pub fn issue_pair(&self, principal: &Principal, session_id: &str) -> Result<TokenPair, ApiError> {
        Ok(TokenPair {
            access_token: self.generate_access_token(principal, session_id)?,
            refresh_token: self.generate_refresh_token(principal, session_id)?,
            token_type: "Bearer".to_string(),
            expires_in: self.access_lifetime_secs,
        })
    }

    /// Signature and expiry check only; the caller decides which token type
    /// it accepts.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| ApiError::Unauthenticated(format!("Invalid token: {}", e)))
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims, ApiError> {
        expect_type(self.validate_token(token)?, ACCESS_TOKEN)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, ApiError> {
        expect_type(self.validate_token(token)?, REFRESH_TOKEN)
    }
}

fn expect_type(claims: Claims, token_type: &str) -> Result<Claims, ApiError> {
    if claims.token_type == token_type {
        Ok(claims)
    } else {
        Err(ApiError::Unauthenticated(format!("Expected {} token", token_type)))
    }
}

/// Token part of an `Authorization: Bearer <token>` header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// Extractors
// =============================================================================

/// Any authenticated principal with a live session.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub claims: Claims,
}

/// An active user of an active tenant.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub tenant: Tenant,
    pub session_id: String,
}

/// A super-admin.
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub admin: SuperAdmin,
    pub session_id: String,
}

/// Validates the bearer access token and its session.
async fn authenticate(parts: &Parts, state: &AppState) -> Result<Claims, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthenticated("Missing authorization header".to_string()))?;

    let token = extract_bearer_token(header)
        .ok_or_else(|| ApiError::Unauthenticated("Expected a bearer token".to_string()))?;

    let claims = state.jwt.validate_access_token(token)?;
    check_session(state, &claims).await?;
    Ok(claims)
}

/// Confirms the session named by `claims` is live and belongs to its subject.
pub(crate) async fn check_session(state: &AppState, claims: &Claims) -> Result<(), ApiError> {
    let session = state
        .master
        .sessions()
        .get_active(&claims.sid)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("Session has ended".to_string()))?;

    if session.principal_id != claims.sub || session.principal_kind != claims.kind {
        debug!(session_id = %claims.sid, "Token subject does not match session");
        return Err(ApiError::Unauthenticated("Session has ended".to_string()));
    }
    Ok(())
}

/// Loads a user and their tenant, refusing inactive ones.
pub(crate) async fn load_active_user(state: &AppState, user_id: &str) -> Result<(User, Tenant), ApiError> {
    let user = state
        .master
        .users()
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("User no longer exists".to_string()))?;

    if !user.is_active {
        return Err(ApiError::Forbidden("User account is not active".to_string()));
    }

    let tenant = state
        .master
        .tenants()
        .get_by_id(&user.tenant_id)
        .await?
        .ok_or_else(|| ApiError::Forbidden("Tenant no longer exists".to_string()))?;

    if !tenant.is_active {
        return Err(ApiError::Forbidden(format!("Tenant is inactive: {}", tenant.code)));
    }

    Ok((user, tenant))
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = authenticate(parts, state).await?;
        Ok(AuthSession { claims })
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = authenticate(parts, state).await?;
        if claims.kind != PrincipalKind::User {
            return Err(ApiError::Forbidden("This endpoint requires a user account".to_string()));
        }

        let (user, tenant) = load_active_user(state, &claims.sub).await?;
        Ok(AuthUser {
            user,
            tenant,
            session_id: claims.sid,
        })
    }
}

impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = authenticate(parts, state).await?;
        if claims.kind != PrincipalKind::SuperAdmin {
            return Err(ApiError::Forbidden("This endpoint requires a super-admin".to_string()));
        }

        let admin = state
            .master
            .admins()
            .get_by_id(&claims.sub)
            .await?
            .ok_or_else(|| ApiError::Unauthenticated("Super-admin no longer exists".to_string()))?;

        Ok(AuthAdmin {
            admin,
            session_id: claims.sid,
        })
    }
}
