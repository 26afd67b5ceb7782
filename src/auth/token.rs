use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Default lifetime of an access token.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Represents the claims encoded within an access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Username of the account the token was issued to.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
    /// Issue timestamp (seconds since epoch).
    pub iat: usize,
}

/// Signs and verifies HS256 access tokens with a single symmetric key.
///
/// Tokens carry everything needed to check them, so no session state is kept.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `username` that expires after the configured TTL.
    pub fn issue(&self, username: &str) -> Result<String, AppError> {
        self.issue_with_ttl(username, self.ttl)
    }

    /// Issues a token for `username` that expires `ttl` from now.
    pub fn issue_with_ttl(&self, username: &str, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::InternalServerError("token lifetime out of range".into()))?;

        let claims = Claims {
            sub: username.to_string(),
            exp: expiration.timestamp().max(0) as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Checks signature, algorithm and expiry, and returns the claims.
    ///
    /// Every failure, whether malformed, forged, expired or missing a claim, is
    /// the same `AppError::Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}
