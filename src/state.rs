use actix_web::web;

use crate::{
    auth::Authenticator,
    cache::{self, CacheAside},
    config::Config,
    db::{self, TaskRepository, UserRepository},
    error::AppError,
    services::TaskService,
};

/// Shared handles registered as app data on every worker.
#[derive(Clone)]
pub struct AppState {
    pub authenticator: web::Data<Authenticator>,
    pub tasks: web::Data<TaskService>,
}

impl AppState {
    /// Connects the store, builds the cache backend and wires the services.
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let pool = db::connect(&config.database_url).await?;
        let backend = cache::from_backend(&config.cache)?;
        log::info!("task list cache: {}", config.cache.name());

        let authenticator = Authenticator::from_config(UserRepository::new(pool.clone()), config)?;
        let tasks = TaskService::new(TaskRepository::new(pool), CacheAside::new(backend));

        Ok(Self {
            authenticator: web::Data::new(authenticator),
            tasks: web::Data::new(tasks),
        })
    }
}
