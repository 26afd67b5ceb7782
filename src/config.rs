use std::env;

use crate::error::AppError;

/// Signing key used when `JWT_SECRET` is unset outside production.
const DEVELOPMENT_SECRET: &str = "development-only-insecure-secret";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Which backend sits behind the task-list cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    Disabled,
    Memory,
    Redis(String),
}

impl CacheBackend {
    pub fn name(&self) -> &'static str {
        match self {
            CacheBackend::Disabled => "disabled",
            CacheBackend::Memory => "memory",
            CacheBackend::Redis(_) => "redis",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub environment: Environment,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub bcrypt_cost: u32,
    pub cache: CacheBackend,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// In production a missing `JWT_SECRET` is an error; in development the
    /// built-in secret is used and a warning is logged.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            None | Some("development") | Some("dev") => Environment::Development,
            Some("production") | Some("prod") => Environment::Production,
            Some(other) => {
                return Err(AppError::Config(format!("unknown APP_ENV '{}'", other)));
            }
        };

        let jwt_secret = match (lookup("JWT_SECRET"), environment) {
            (Some(secret), _) if !secret.is_empty() => secret,
            (_, Environment::Production) => {
                return Err(AppError::Config(
                    "JWT_SECRET must be set in production".into(),
                ));
            }
            (_, Environment::Development) => {
                log::warn!("JWT_SECRET not set, falling back to the development secret");
                DEVELOPMENT_SECRET.to_string()
            }
        };

        let cache = match lookup("CACHE_BACKEND").as_deref().unwrap_or("memory") {
            "memory" => CacheBackend::Memory,
            "disabled" | "none" => CacheBackend::Disabled,
            "redis" => CacheBackend::Redis(lookup("REDIS_URL").ok_or_else(|| {
                AppError::Config("REDIS_URL must be set when CACHE_BACKEND=redis".into())
            })?),
            other => {
                return Err(AppError::Config(format!("unknown CACHE_BACKEND '{}'", other)));
            }
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://tasks.db".to_string()),
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            environment,
            jwt_secret,
            token_ttl_minutes: parse_or(&lookup, "TOKEN_TTL_MINUTES", 30)?,
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            cache,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a number, got '{}'", key, raw))),
        None => Ok(default),
    }
}
