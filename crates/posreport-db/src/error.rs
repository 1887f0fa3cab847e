//! # Database Error Types
//!
//! One error type for both the master catalog and tenant books. sqlx errors
//! are folded into it by [`From`], with constraint failures recognised for
//! SQLite and PostgreSQL alike.
//!
//! | Variant              | Reaches the client as |
//! |----------------------|-----------------------|
//! | `NotFound`           | 404                   |
//! | `UniqueViolation`    | 409                   |
//! | `TenantInactive`     | 403                   |
//! | `ConnectionFailed`,  | 503                   |
//! | `PoolExhausted`      |                       |
//! | everything else      | 400 or 500            |

use posreport_core::CoreError;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Failure of a master or tenant database call.
#[derive(Debug, Error)]
pub enum DbError {
    /// Lookup by id or code matched nothing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Tenant code, username, or a per-book code/invoice number collided.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Row points at an account, item or party that isn't there.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    #[error("Tenant is inactive: {code}")]
    TenantInactive { code: String },

    /// Tenant settings don't describe a reachable database.
    #[error("Invalid tenant connection: {0}")]
    InvalidConnection(String),

    /// Unbalanced voucher, invoice without lines and similar bookkeeping
    /// mistakes caught before anything is written.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Stored text that doesn't decode (unknown enum value, bad date).
    #[error("Corrupt record: {0}")]
    Corrupt(#[from] CoreError),

    /// File can't be opened, server unreachable, credentials refused.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Timed out waiting for a pooled connection.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Extracts the constrained column from a unique-violation message.
///
/// ```text
/// SQLite:      UNIQUE constraint failed: users.username
/// PostgreSQL:  duplicate key value violates unique constraint "accounts_code_key"
/// ```
fn unique_field(message: &str) -> String {
    if let Some(rest) = message.split("UNIQUE constraint failed: ").nth(1) {
        return rest.to_string();
    }
    message
        .split('"')
        .nth(1)
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Constraint failures are classified via [`ErrorKind`], which sqlx fills
/// in for both drivers; transport failures become `ConnectionFailed`.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();
                match db_err.kind() {
                    ErrorKind::UniqueViolation => DbError::UniqueViolation {
                        field: unique_field(&msg),
                        value: "unknown".to_string(),
                    },
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message: msg },
                    _ => DbError::QueryFailed(msg),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),
            sqlx::Error::Tls(e) => DbError::ConnectionFailed(e.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
