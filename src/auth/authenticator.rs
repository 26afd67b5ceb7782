use actix_web::web;
use chrono::Duration;

use super::{hash_password, verify_password, TokenIssuer};
use crate::{
    config::Config,
    db::UserRepository,
    error::{AppError, LOGIN_REJECTED, TOKEN_REJECTED},
    models::User,
};

/// Registers users, checks their passwords and issues/validates bearer tokens.
pub struct Authenticator {
    users: UserRepository,
    tokens: TokenIssuer,
    hash_cost: u32,
    // Verified against when the username is unknown, so both login failure
    // paths do the same bcrypt work.
    dummy_hash: String,
}

impl Authenticator {
    pub fn new(users: UserRepository, tokens: TokenIssuer, hash_cost: u32) -> Result<Self, AppError> {
        let dummy_hash = hash_password("placeholder-password", hash_cost)?;
        Ok(Self {
            users,
            tokens,
            hash_cost,
            dummy_hash,
        })
    }

    pub fn from_config(users: UserRepository, config: &Config) -> Result<Self, AppError> {
        let tokens = TokenIssuer::new(
            &config.jwt_secret,
            Duration::minutes(config.token_ttl_minutes),
        );
        Self::new(users, tokens, config.bcrypt_cost)
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Creates an account. Fails with `AlreadyExists` on an exact username match.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        if self.users.exists(username).await? {
            return Err(AppError::AlreadyExists("User already exists".into()));
        }

        let password = password.to_owned();
        let cost = self.hash_cost;
        let password_hash = run_blocking(move || hash_password(&password, cost)).await?;

        let user = self.users.insert(username, &password_hash).await?;
        log::info!("registered user '{}' (id {})", user.username, user.id);
        Ok(user)
    }

    /// Checks a username/password pair.
    ///
    /// Unknown users and wrong passwords produce the same error. A stored hash
    /// that bcrypt cannot parse is a server error, not a rejected login.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self.users.find_by_username(username).await?;

        let stored_hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());
        let password = password.to_owned();
        let matches = run_blocking(move || verify_password(&password, &stored_hash)).await?;

        match user {
            Some(user) if matches => Ok(user),
            _ => {
                log::info!("rejected login for '{}'", username);
                Err(AppError::Unauthorized(LOGIN_REJECTED.into()))
            }
        }
    }

    pub fn issue_token(&self, username: &str) -> Result<String, AppError> {
        self.tokens.issue(username)
    }

    /// Verifies `token` and loads its subject.
    ///
    /// The user is read from the store on every call, so a token outlives
    /// neither its expiry nor its account.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.tokens.verify(token)?;

        match self.users.find_by_username(&claims.sub).await? {
            Some(user) => Ok(user),
            None => {
                log::debug!("token subject '{}' no longer exists", claims.sub);
                Err(AppError::Unauthorized(TOKEN_REJECTED.into()))
            }
        }
    }
}

/// Runs CPU-heavy hashing on the blocking pool.
async fn run_blocking<F, T>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| AppError::InternalServerError(format!("blocking task failed: {}", e)))?
}
