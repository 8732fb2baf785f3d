use async_trait::async_trait;

use super::PgStore;
use crate::error::{AppError, AppResult};
use crate::models::{AdditionalOption, Dish, DishId, Hole, HoleId, OptionId};
use crate::store::CatalogStore;

#[async_trait]
impl CatalogStore for PgStore {
    async fn holes(&self) -> AppResult<Vec<Hole>> {
        let holes = sqlx::query_as::<_, Hole>(
            "SELECT id, name, description, number_of_seats FROM holes ORDER BY id",
        )
        .fetch_all(&self.db.pool)
        .await?;
        Ok(holes)
    }

    async fn hole(&self, id: HoleId) -> AppResult<Hole> {
        sqlx::query_as::<_, Hole>(
            "SELECT id, name, description, number_of_seats FROM holes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?
        .ok_or_else(|| AppError::not_found("hole", id))
    }

    async fn dishes(&self) -> AppResult<Vec<Dish>> {
        let dishes = sqlx::query_as::<_, Dish>(
            "SELECT id, name, price, description, dish_type FROM dishes ORDER BY id",
        )
        .fetch_all(&self.db.pool)
        .await?;
        Ok(dishes)
    }

    async fn dish(&self, id: DishId) -> AppResult<Dish> {
        sqlx::query_as::<_, Dish>(
            "SELECT id, name, price, description, dish_type FROM dishes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?
        .ok_or_else(|| AppError::not_found("dish", id))
    }

    async fn options(&self) -> AppResult<Vec<AdditionalOption>> {
        let options = sqlx::query_as::<_, AdditionalOption>(
            "SELECT id, name, description, price FROM additional_options ORDER BY id",
        )
        .fetch_all(&self.db.pool)
        .await?;
        Ok(options)
    }

    async fn missing_options(&self, ids: &[OptionId]) -> AppResult<Vec<OptionId>> {
        let found: Vec<OptionId> =
            sqlx::query_scalar("SELECT id FROM additional_options WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.db.pool)
                .await?;
        Ok(ids
            .iter()
            .copied()
            .filter(|id| !found.contains(id))
            .collect())
    }
}
