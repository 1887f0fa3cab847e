//! Error types for the Report API.
//!
//! Every failure leaves the server as `{ "code": "...", "message": "..." }`
//! with the status from [`ApiError::status_code`]. Internal details are
//! logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use posreport_core::{CoreError, ValidationError};
use posreport_db::DbError;

/// Report API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

/// Wire shape of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Validation(_) => "validation_failed",
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Unavailable(_) => "unavailable",
            ApiError::Internal(_) => "internal",
        }
    }

    /// Same message for unknown users and wrong passwords.
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthenticated("Invalid username or password".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal service error");
                "Internal server error".to_string()
            }
            ApiError::Unavailable(detail) => {
                tracing::warn!(error = %detail, "Dependency unavailable");
                "Service temporarily unavailable".to_string()
            }
            ApiError::Unauthenticated(_) | ApiError::Forbidden(_) => {
                tracing::info!("Authorization error: {}", self);
                self.to_string()
            }
            _ => {
                tracing::debug!("Client error: {}", self);
                self.to_string()
            }
        };

        let body = ErrorBody {
            code: self.code(),
            message,
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(error: DbError) -> Self {
        match error {
            DbError::NotFound { .. } => ApiError::NotFound(error.to_string()),
            DbError::UniqueViolation { .. } => ApiError::Conflict(error.to_string()),
            DbError::ForeignKeyViolation { .. }
            | DbError::InvalidData(_)
            | DbError::InvalidConnection(_) => ApiError::BadRequest(error.to_string()),
            DbError::TenantInactive { .. } => ApiError::Forbidden(error.to_string()),
            DbError::ConnectionFailed(_) | DbError::PoolExhausted => ApiError::Unavailable(error.to_string()),
            DbError::Corrupt(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::Internal(_) => ApiError::Internal(error.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(v) => ApiError::Validation(v),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_map_to_statuses() {
        let cases = [
            (DbError::not_found("Tenant", "t1"), StatusCode::NOT_FOUND),
            (DbError::duplicate("username", "amir"), StatusCode::CONFLICT),
            (DbError::TenantInactive { code: "ACME".into() }, StatusCode::FORBIDDEN),
            (DbError::PoolExhausted, StatusCode::SERVICE_UNAVAILABLE),
            (DbError::QueryFailed("syntax".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (DbError::InvalidConnection("bad url".into()), StatusCode::BAD_REQUEST),
        ];

        for (db_error, status) in cases {
            assert_eq!(ApiError::from(db_error).status_code(), status);
        }
    }

    #[test]
    fn test_core_validation_keeps_its_code() {
        let err = ApiError::from(CoreError::Validation(ValidationError::Required {
            field: "username".into(),
        }));
        assert_eq!(err.code(), "validation_failed");

        let err = ApiError::from(CoreError::InvalidDate {
            field: "from".into(),
            value: "yesterday".into(),
        });
        assert_eq!(err.code(), "bad_request");
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let response = ApiError::Internal("disk on fire".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
