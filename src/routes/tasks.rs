use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{NewTask, TaskUpdate},
    services::TaskService,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;

/// Lists every task.
///
/// Public; served through the task-list cache.
///
/// ## Responses:
/// - `200 OK`: JSON array of `{id, task, done}` in id order.
/// - `500 Internal Server Error`: store failure.
#[get("/")]
pub async fn list_tasks(service: web::Data<TaskService>) -> Result<impl Responder, AppError> {
    let tasks = service.list().await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task.
///
/// ## Request Body:
/// - `task`: the text, 1 to 100 characters and not blank.
/// - `done` (optional): defaults to `false`.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `401 Unauthorized`: missing or invalid bearer token.
/// - `422 Unprocessable Entity`: invalid body.
#[post("/")]
pub async fn create_task(
    service: web::Data<TaskService>,
    AuthenticatedUser(user): AuthenticatedUser,
    task_data: web::Json<NewTask>,
) -> Result<impl Responder, AppError> {
    let task = service.create(&user, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Updates the supplied fields of a task.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `401 Unauthorized`, `404 Not Found`, `422 Unprocessable Entity`.
#[put("/{id}")]
pub async fn update_task(
    service: web::Data<TaskService>,
    AuthenticatedUser(user): AuthenticatedUser,
    task_id: web::Path<i64>,
    task_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    let task = service
        .update(&user, task_id.into_inner(), task_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task.
///
/// ## Responses:
/// - `200 OK`: `{"message": ...}`.
/// - `401 Unauthorized`, `404 Not Found`.
#[delete("/{id}")]
pub async fn delete_task(
    service: web::Data<TaskService>,
    AuthenticatedUser(user): AuthenticatedUser,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    service.delete(&user, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Task deleted successfully"
    })))
}
