use sqlx::SqlitePool;

use crate::core::Result;
use crate::modules::users::models::{NewUser, User};

/// Repository for user database operations
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find an existing user by chat id or register a new one
    pub async fn find_or_create(&self, new_user: &NewUser) -> Result<User> {
        if let Some(user) = self.find_by_chat_id(new_user.chat_id).await? {
            return Ok(user);
        }

        let id = sqlx::query(
            r#"
            INSERT INTO users (chat_id, name, timezone)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(new_user.chat_id)
        .bind(&new_user.name)
        .bind(&new_user.timezone)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(User {
            id,
            chat_id: new_user.chat_id,
            name: new_user.name.clone(),
            timezone: new_user.timezone.clone(),
        })
    }

    pub async fn find_by_chat_id(&self, chat_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, chat_id, name, timezone
            FROM users
            WHERE chat_id = ?
            "#,
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

}
