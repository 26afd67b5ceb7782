use sqlx::SqlitePool;

use crate::{error::AppError, models::User};

/// The credential store: user records keyed by exact username.
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn exists(&self, username: &str) -> Result<bool, AppError> {
        let row = sqlx::query_as::<_, (i64,)>("SELECT id FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// Inserts a user. A concurrent registration of the same name loses on the
    /// UNIQUE constraint and gets `AlreadyExists`.
    pub async fn insert(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash) VALUES (?1, ?2)
             RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::AlreadyExists(_) => AppError::AlreadyExists("User already exists".into()),
            other => other,
        })
    }
}
