pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Registers every route. Expects `web::Data<Authenticator>` and
/// `web::Data<TaskService>` to be present as app data.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::root)
        .service(health::health)
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login),
        )
        .service(
            web::scope("/api")
                .app_data(task_json_config())
                .wrap(AuthMiddleware)
                .service(tasks::list_tasks)
                .service(tasks::create_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}

/// Malformed task bodies are validation failures (422), not bad requests.
fn task_json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}
