//! PostgreSQL-backed user store.
//!
//! Table structure:
//! - `users` - `id BIGSERIAL PRIMARY KEY`, `username TEXT UNIQUE`, `password TEXT`
//!
//! The `password` column holds the digest, never the plaintext.

use async_trait::async_trait;
use sqlx::PgPool;

use super::store::{NewUser, StoreError, User, UsersStore};

pub struct PostgresUsersStore {
    pool: PgPool,
}

impl PostgresUsersStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `users` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::debug!("users table ready");
        Ok(())
    }
}

/// Map a unique-constraint violation to `DuplicateUsername`.
fn map_insert_error(err: sqlx::Error, username: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::DuplicateUsername(username.to_string())
        }
        _ => StoreError::Postgres(err),
    }
}

#[async_trait]
impl UsersStore for PostgresUsersStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO users (username, password)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_digest)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &user.username))?;

        Ok(User {
            id,
            username: user.username,
            password_digest: user.password_digest,
        })
    }

    async fn find_first(&self) -> Result<Option<User>, StoreError> {
        let row: Option<(i64, String, String)> = sqlx::query_as(
            r#"
            SELECT id, username, password
            FROM users
            ORDER BY id
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, username, password_digest)| User {
            id,
            username,
            password_digest,
        }))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}
