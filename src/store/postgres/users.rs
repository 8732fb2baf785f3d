use async_trait::async_trait;

use super::{unique_violation, PgStore};
use crate::error::AppResult;
use crate::models::{NewUser, User, UserId};
use crate::store::UserStore;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, date_joined";

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let email = user.email.clone();
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, first_name, last_name)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_one(&self.db.pool)
        .await
        .map_err(|e| unique_violation(e, || format!("user with email {email} already exists")))
    }

    async fn user(&self, id: UserId) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db.pool)
            .await?;
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.db.pool)
        .await?;
        Ok(user)
    }
}
