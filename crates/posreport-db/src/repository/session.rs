//! # Session Repository
//!
//! Server-side record of every issued token pair. Access and refresh tokens
//! carry the session id; a token is honoured only while its session row is
//! unrevoked and unexpired, so logout and deactivation take effect on the
//! next request.

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use posreport_core::{PrincipalKind, Session};

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: String,
    principal_id: String,
    principal_kind: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl TryFrom<SessionRow> for Session {
    type Error = DbError;

    fn try_from(row: SessionRow) -> DbResult<Self> {
        Ok(Session {
            id: row.id,
            principal_id: row.principal_id,
            principal_kind: row.principal_kind.parse()?,
            issued_at: row.issued_at,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Opens a session lasting `ttl` (the refresh token lifetime).
    pub async fn create(
        &self,
        principal_id: &str,
        principal_kind: PrincipalKind,
        ttl: Duration,
    ) -> DbResult<Session> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            principal_id: principal_id.to_string(),
            principal_kind,
            issued_at: now,
            expires_at: now + ttl,
            revoked_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO sessions (id, principal_id, principal_kind, issued_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4, $5, NULL)
            "#,
        )
        .bind(&session.id)
        .bind(&session.principal_id)
        .bind(session.principal_kind.as_str())
        .bind(session.issued_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        debug!(session_id = %session.id, principal_id = %principal_id, kind = %principal_kind, "Session opened");
        Ok(session)
    }

    /// Returns the session when it exists, is unrevoked and unexpired.
    pub async fn get_active(&self, id: &str) -> DbResult<Option<Session>> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, principal_id, principal_kind, issued_at, expires_at, revoked_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let now = Utc::now();
        Ok(row
            .map(Session::try_from)
            .transpose()?
            .filter(|s| s.is_active_at(now)))
    }

    /// Revokes one session. Returns `false` if it was unknown or already revoked.
    pub async fn revoke(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("UPDATE sessions SET revoked_at = $1 WHERE id = $2 AND revoked_at IS NULL")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revokes every open session of a principal. Returns how many were closed.
    pub async fn revoke_all_for_principal(
        &self,
        principal_id: &str,
        principal_kind: PrincipalKind,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE sessions SET revoked_at = $1
            WHERE principal_id = $2 AND principal_kind = $3 AND revoked_at IS NULL
            "#,
        )
        .bind(Utc::now())
        .bind(principal_id)
        .bind(principal_kind.as_str())
        .execute(&self.pool)
        .await?;

        debug!(principal_id = %principal_id, revoked = result.rows_affected(), "Sessions revoked");
        Ok(result.rows_affected())
    }

    /// Deletes expired and revoked sessions. Returns how many rows went.
    pub async fn purge_expired(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1 OR revoked_at IS NOT NULL")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MasterDb;

    #[tokio::test]
    async fn test_session_lifecycle() {
        let db = MasterDb::in_memory().await.unwrap();
        let repo = db.sessions();

        let session = repo
            .create("user-1", PrincipalKind::User, Duration::hours(1))
            .await
            .unwrap();

        let active = repo.get_active(&session.id).await.unwrap().unwrap();
        assert_eq!(active.principal_kind, PrincipalKind::User);

        assert!(repo.revoke(&session.id).await.unwrap());
        assert!(!repo.revoke(&session.id).await.unwrap());
        assert!(repo.get_active(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoke_all_only_touches_principal() {
        let db = MasterDb::in_memory().await.unwrap();
        let repo = db.sessions();

        let a = repo.create("user-1", PrincipalKind::User, Duration::hours(1)).await.unwrap();
        repo.create("user-1", PrincipalKind::User, Duration::hours(1)).await.unwrap();
        let other = repo.create("user-2", PrincipalKind::User, Duration::hours(1)).await.unwrap();
        let admin = repo
            .create("user-1", PrincipalKind::SuperAdmin, Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(repo.revoke_all_for_principal("user-1", PrincipalKind::User).await.unwrap(), 2);
        assert!(repo.get_active(&a.id).await.unwrap().is_none());
        assert!(repo.get_active(&other.id).await.unwrap().is_some());
        assert!(repo.get_active(&admin.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expired_sessions_inactive_and_purged() {
        let db = MasterDb::in_memory().await.unwrap();
        let repo = db.sessions();

        let expired = repo
            .create("user-1", PrincipalKind::User, Duration::seconds(-5))
            .await
            .unwrap();
        let live = repo.create("user-1", PrincipalKind::User, Duration::hours(1)).await.unwrap();

        assert!(repo.get_active(&expired.id).await.unwrap().is_none());

        assert_eq!(repo.purge_expired().await.unwrap(), 1);
        assert!(repo.get_active(&live.id).await.unwrap().is_some());
    }
}
