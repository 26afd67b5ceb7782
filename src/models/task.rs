use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Represents a task as stored in the database and returned by the API.
///
/// The text is exposed as `task` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Task {
    pub id: i64,
    #[serde(rename = "task")]
    pub text: String,
    pub done: bool,
}

/// Payload for creating a task. `done` defaults to `false`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTask {
    #[serde(rename = "task")]
    #[validate(length(max = 100), custom = "not_blank")]
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

/// Partial update payload. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TaskUpdate {
    #[serde(rename = "task", default)]
    #[validate(length(max = 100), custom = "not_blank")]
    pub text: Option<String>,
    #[serde(default)]
    pub done: Option<bool>,
}

impl NewTask {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            done: false,
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("The task cannot be empty.".into());
        return Err(err);
    }
    Ok(())
}
