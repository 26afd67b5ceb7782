pub mod authenticator;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

// Re-export necessary items
pub use authenticator::Authenticator;
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenIssuer, DEFAULT_TOKEN_TTL_MINUTES};

/// Represents the payload for a new user registration request.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[validate(schema(function = "passwords_match", skip_on_field_errors = false))]
pub struct RegisterRequest {
    /// Desired username, at most 50 characters.
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    /// Password for the new account, at least 4 characters.
    #[validate(length(min = 4))]
    pub password: String,
    /// Optional repetition of `password`; must match it when present.
    #[serde(default)]
    pub confirm_password: Option<String>,
}

fn passwords_match(request: &RegisterRequest) -> Result<(), ValidationError> {
    match &request.confirm_password {
        Some(confirm) if confirm != &request.password => {
            let mut err = ValidationError::new("passwords_mismatch");
            err.message = Some("Passwords do not match".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Form-encoded login credentials.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The signed access token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}
