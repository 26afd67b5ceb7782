use crate::{
    auth::{Authenticator, LoginForm, RegisterRequest, TokenResponse},
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// ## Responses:
/// - `201 Created`: `{"message": ...}`.
/// - `400 Bad Request`: duplicate username, invalid fields or mismatched confirmation.
#[post("/register")]
pub async fn register(
    authenticator: web::Data<Authenticator>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    authenticator
        .register(&register_data.username, &register_data.password)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "User registered successfully"
    })))
}

/// Login user
///
/// Takes a form-encoded `username` and `password` and returns a bearer token.
///
/// ## Responses:
/// - `200 OK`: `{"access_token": ..., "token_type": "bearer"}`.
/// - `401 Unauthorized`: unknown user or wrong password, indistinguishably.
#[post("/login")]
pub async fn login(
    authenticator: web::Data<Authenticator>,
    form: web::Form<LoginForm>,
) -> Result<impl Responder, AppError> {
    let user = authenticator
        .authenticate(&form.username, &form.password)
        .await?;
    let token = authenticator.issue_token(&user.username)?;

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token)))
}
