use async_trait::async_trait;

use super::PgStore;
use crate::error::{AppError, AppResult};
use crate::models::{EventId, NewOrder, OrderId, OrderedDish, UserId};
use crate::store::OrderStore;

const ORDER_COLUMNS: &str = "id, user_id, dish_id, event_id, amount";

#[async_trait]
impl OrderStore for PgStore {
    async fn create_order(&self, new: NewOrder) -> AppResult<OrderedDish> {
        sqlx::query_as::<_, OrderedDish>(&format!(
            "INSERT INTO ordered_dishes (user_id, dish_id, event_id, amount)
             VALUES ($1, $2, $3, $4)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(new.user_id)
        .bind(new.dish_id)
        .bind(new.event_id)
        .bind(new.amount)
        .fetch_one(&self.db.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => AppError::NotFound(
                format!("dish {} or event {}", new.dish_id, new.event_id),
            ),
            _ => AppError::Database(e),
        })
    }

    async fn order(&self, id: OrderId) -> AppResult<OrderedDish> {
        sqlx::query_as::<_, OrderedDish>(&format!(
            "SELECT {ORDER_COLUMNS} FROM ordered_dishes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?
        .ok_or_else(|| AppError::not_found("ordered dish", id))
    }

    async fn orders_for_user(&self, user: UserId) -> AppResult<Vec<OrderedDish>> {
        let orders = sqlx::query_as::<_, OrderedDish>(&format!(
            "SELECT {ORDER_COLUMNS} FROM ordered_dishes WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(orders)
    }

    async fn delete_order(&self, id: OrderId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM ordered_dishes WHERE id = $1")
            .bind(id)
            .execute(&self.db.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("ordered dish", id));
        }
        Ok(())
    }

    async fn dish_total(&self, event: EventId, user: UserId) -> AppResult<f64> {
        let total: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(o.amount * d.price), 0)::DOUBLE PRECISION
             FROM ordered_dishes o
             JOIN dishes d ON d.id = o.dish_id
             WHERE o.event_id = $1 AND o.user_id = $2",
        )
        .bind(event)
        .bind(user)
        .fetch_one(&self.db.pool)
        .await?;
        Ok(total)
    }

    async fn options_total(&self, event: EventId) -> AppResult<f64> {
        let total: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(a.price), 0)::DOUBLE PRECISION
             FROM event_options eo
             JOIN additional_options a ON a.id = eo.option_id
             WHERE eo.event_id = $1",
        )
        .bind(event)
        .fetch_one(&self.db.pool)
        .await?;
        Ok(total)
    }
}
