//! # User Repository
//!
//! Profiles live in `users`; password hashes in `user_credentials`. Hashing
//! happens in the server's session gate, this crate only stores the PHC
//! string.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stocksence_core::User;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts the profile and its credential in one transaction.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn create_with_password(&self, user: &User, password_hash: &str) -> DbResult<User> {
        debug!(id = %user.id, "Creating user");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query("INSERT INTO users (id, email, full_name, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.full_name)
            .bind(user.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &user.email),
                other => other,
            })?;

        sqlx::query(
            "INSERT INTO user_credentials (user_id, password_hash, updated_at) VALUES (?1, ?2, ?3)",
        )
        .bind(&user.id)
        .bind(password_hash)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(user.clone())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, full_name, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Case-insensitive lookup.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, full_name, created_at FROM users WHERE email = ?1",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// The stored PHC hash for `user_id`.
    pub async fn password_hash_for(&self, user_id: &str) -> DbResult<Option<String>> {
        let hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM user_credentials WHERE user_id = ?1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(hash)
    }
}

pub fn generate_user_id() -> String {
    Uuid::new_v4().to_string()
}
