use async_trait::async_trait;

use super::PgStore;
use crate::error::{AppError, AppResult};
use crate::models::{Comment, CommentId, NewComment};
use crate::store::CommentStore;

#[async_trait]
impl CommentStore for PgStore {
    async fn create_comment(&self, new: NewComment) -> AppResult<Comment> {
        sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (user_id, text) VALUES ($1, $2) RETURNING id, user_id, text",
        )
        .bind(new.user_id)
        .bind(&new.text)
        .fetch_one(&self.db.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::not_found("user", new.user_id)
            }
            _ => AppError::Database(e),
        })
    }

    async fn comment(&self, id: CommentId) -> AppResult<Comment> {
        sqlx::query_as::<_, Comment>("SELECT id, user_id, text FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db.pool)
            .await?
            .ok_or_else(|| AppError::not_found("comment", id))
    }

    async fn comments(&self) -> AppResult<Vec<Comment>> {
        let comments =
            sqlx::query_as::<_, Comment>("SELECT id, user_id, text FROM comments ORDER BY id")
                .fetch_all(&self.db.pool)
                .await?;
        Ok(comments)
    }

    async fn delete_comment(&self, id: CommentId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.db.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("comment", id));
        }
        Ok(())
    }
}
