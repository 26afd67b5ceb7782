use serde::Serialize;
use sqlx::FromRow;

/// A registered account as stored in the `users` table.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}
