use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{NewTask, Task, TaskUpdate},
};

/// The task store. Iteration order is ascending id, i.e. insertion order.
#[derive(Clone)]
pub struct TaskRepository {
    pool: SqlitePool,
}

impl TaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>("SELECT id, text, done FROM tasks ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(tasks)
    }

    pub async fn insert(&self, input: &NewTask) -> Result<Task, AppError> {
        let task = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (text, done) VALUES (?1, ?2) RETURNING id, text, done",
        )
        .bind(&input.text)
        .bind(input.done)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    /// Applies the supplied fields only. Returns `None` when no row has `id`.
    pub async fn update(&self, id: i64, input: &TaskUpdate) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(
            "UPDATE tasks
             SET text = COALESCE(?1, text), done = COALESCE(?2, done)
             WHERE id = ?3
             RETURNING id, text, done",
        )
        .bind(input.text.as_deref())
        .bind(input.done)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
