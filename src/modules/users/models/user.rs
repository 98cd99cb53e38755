use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A chat user owning zero or more loans
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    /// Chat transport identifier, unique per user
    pub chat_id: i64,
    pub name: String,
    pub timezone: String,
}

/// Fields needed to register a user on first contact
#[derive(Debug, Clone)]
pub struct NewUser {
    pub chat_id: i64,
    pub name: String,
    pub timezone: String,
}

impl NewUser {
    pub fn new(chat_id: i64, name: impl Into<String>) -> Self {
        Self {
            chat_id,
            name: name.into(),
            timezone: "Europe/Amsterdam".to_string(),
        }
    }
}
