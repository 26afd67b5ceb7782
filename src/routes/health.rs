use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::services::TaskService;

/// Root greeting.
#[get("/")]
pub async fn root() -> impl Responder {
    HttpResponse::Ok().json(json!({ "message": "Hello World" }))
}

/// Liveness report with the cache backend serving the task list.
#[get("/health")]
pub async fn health(tasks: web::Data<TaskService>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "cache": tasks.cache_backend(),
        "timestamp": Utc::now()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheAside, MemoryCache};
    use crate::db::{self, TaskRepository};
    use actix_web::{test, App};
    use std::sync::Arc;

    async fn task_service(cache: CacheAside) -> web::Data<TaskService> {
        let pool = db::connect("sqlite::memory:").await.unwrap();
        web::Data::new(TaskService::new(TaskRepository::new(pool), cache))
    }

    #[actix_web::test]
    async fn test_health_reports_cache_backend() {
        let memory = CacheAside::new(Some(Arc::new(MemoryCache::new())));
        for (cache, expected) in [(memory, "memory"), (CacheAside::disabled(), "disabled")] {
            let app = test::init_service(
                App::new()
                    .app_data(task_service(cache).await)
                    .service(health),
            )
            .await;

            let req = test::TestRequest::get().uri("/health").to_request();
            let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;

            assert_eq!(json["status"], "ok");
            assert_eq!(json["cache"], expected);
            assert!(json["timestamp"].is_string());
        }
    }

    #[actix_web::test]
    async fn test_root_greeting() {
        let app = test::init_service(App::new().service(root)).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(json["message"], "Hello World");
    }
}
