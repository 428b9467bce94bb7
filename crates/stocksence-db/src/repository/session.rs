//! # Session Repository
//!
//! Server-side session rows. A token is only honoured while its row exists
//! and `expires_at` is in the future, so deleting the row revokes the token.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

/// One signed-in session.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SessionRecord {
    /// Also the token's `jti` claim.
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    pub async fn create(&self, session: &SessionRecord) -> DbResult<()> {
        debug!(session_id = %session.id, user_id = %session.user_id, "Creating session");

        sqlx::query(
            "INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The session if it exists and has not expired at `now`.
    pub async fn get_active(&self, id: &str, now: DateTime<Utc>) -> DbResult<Option<SessionRecord>> {
        let session = sqlx::query_as::<_, SessionRecord>(
            "SELECT * FROM sessions WHERE id = ?1 AND expires_at > ?2",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Returns whether a row was removed. Deleting twice is not an error.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Purges sessions expired at `now`. Returns how many were removed.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            debug!(removed = result.rows_affected(), "Purged expired sessions");
        }

        Ok(result.rows_affected())
    }
}
