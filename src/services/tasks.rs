use validator::Validate;

use crate::{
    cache::{CacheAside, TASKS_KEY},
    db::TaskRepository,
    error::AppError,
    models::{NewTask, Task, TaskUpdate, User},
};

/// CRUD over tasks with a cached list view.
///
/// Mutations take the `User` returned by token validation, so they cannot be
/// reached without authentication. Each mutation goes through
/// `CacheAside::write_through`, which refreshes the `"tasks"` entry.
#[derive(Clone)]
pub struct TaskService {
    tasks: TaskRepository,
    cache: CacheAside,
}

impl TaskService {
    pub fn new(tasks: TaskRepository, cache: CacheAside) -> Self {
        Self { tasks, cache }
    }

    /// Which cache backend serves the list.
    pub fn cache_backend(&self) -> &'static str {
        self.cache.backend_name()
    }

    /// All tasks in id order, served from the cache when possible.
    pub async fn list(&self) -> Result<Vec<Task>, AppError> {
        self.cache
            .read_through(TASKS_KEY, || self.tasks.list())
            .await
    }

    pub async fn create(&self, user: &User, input: NewTask) -> Result<Task, AppError> {
        input.validate()?;

        let task = self
            .cache
            .write_through(TASKS_KEY, self.tasks.insert(&input), || self.tasks.list())
            .await?;

        log::info!("task {} created by '{}'", task.id, user.username);
        Ok(task)
    }

    pub async fn update(&self, user: &User, id: i64, input: TaskUpdate) -> Result<Task, AppError> {
        input.validate()?;

        let mutation = async {
            self.tasks
                .update(id, &input)
                .await?
                .ok_or_else(|| AppError::NotFound("Task not found".into()))
        };
        let task = self
            .cache
            .write_through(TASKS_KEY, mutation, || self.tasks.list())
            .await?;

        log::info!("task {} updated by '{}'", task.id, user.username);
        Ok(task)
    }

    pub async fn delete(&self, user: &User, id: i64) -> Result<(), AppError> {
        let mutation = async {
            if self.tasks.delete(id).await? {
                Ok(())
            } else {
                Err(AppError::NotFound("Task not found".into()))
            }
        };
        self.cache
            .write_through(TASKS_KEY, mutation, || self.tasks.list())
            .await?;

        log::info!("task {} deleted by '{}'", id, user.username);
        Ok(())
    }
}
