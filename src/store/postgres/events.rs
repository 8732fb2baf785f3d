use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use tracing::info;

use super::{seats, PgStore};
use crate::error::{AppError, AppResult};
use crate::models::{AdditionalOption, Event, EventId, NewEvent, OptionId, Seat, UserId};
use crate::store::{EventFilter, EventStore};

const EVENT_COLUMNS: &str =
    "id, user_id, hole_id, description, event_type, date_created, date_planned, is_passed";

#[async_trait]
impl EventStore for PgStore {
    async fn create_event(&self, new: NewEvent) -> AppResult<(Event, Vec<Seat>)> {
        let mut tx = self.db.pool.begin().await?;

        // FOR SHARE keeps the hall capacity stable until the inventory is in
        let seat_count: i32 =
            sqlx::query_scalar("SELECT number_of_seats FROM holes WHERE id = $1 FOR SHARE")
                .bind(new.hole_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::not_found("hole", new.hole_id))?;

        let event = sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events (user_id, hole_id, description, event_type, date_planned)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(new.owner)
        .bind(new.hole_id)
        .bind(&new.description)
        .bind(new.event_type)
        .bind(new.date_planned)
        .fetch_one(&mut *tx)
        .await?;

        // An error here drops `tx`, which rolls the event insert back.
        let seats = seats::create_inventory(&mut tx, event.id, seat_count).await?;

        tx.commit().await?;
        info!(event_id = event.id, owner = event.user_id, "event created");
        Ok((event, seats))
    }

    async fn event(&self, id: EventId) -> AppResult<Event> {
        sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db.pool)
            .await?
            .ok_or_else(|| AppError::not_found("event", id))
    }

    async fn events_for_owner(&self, owner: UserId, filter: &EventFilter) -> AppResult<Vec<Event>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {EVENT_COLUMNS} FROM events WHERE user_id = "));
        query.push_bind(owner);
        if let Some(event_type) = filter.event_type {
            query.push(" AND event_type = ").push_bind(event_type);
        }
        if let Some(is_passed) = filter.is_passed {
            query.push(" AND is_passed = ").push_bind(is_passed);
        }
        if let Some(search) = &filter.search {
            // literal substring, same as EventFilter::matches
            query
                .push(" AND strpos(lower(description), lower(")
                .push_bind(search.clone())
                .push(")) > 0");
        }
        query.push(" ORDER BY id");

        let events = query
            .build_query_as::<Event>()
            .fetch_all(&self.db.pool)
            .await?;
        Ok(events)
    }

    async fn delete_event(&self, id: EventId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.db.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("event", id));
        }
        Ok(())
    }

    async fn mark_passed(&self, id: EventId) -> AppResult<Event> {
        sqlx::query_as::<_, Event>(&format!(
            "UPDATE events SET is_passed = TRUE WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?
        .ok_or_else(|| AppError::not_found("event", id))
    }

    async fn add_options(&self, event: EventId, ids: &[OptionId]) -> AppResult<()> {
        self.event(event).await?;
        sqlx::query(
            "INSERT INTO event_options (event_id, option_id)
             SELECT $1, UNNEST($2::BIGINT[])
             ON CONFLICT DO NOTHING",
        )
        .bind(event)
        .bind(ids)
        .execute(&self.db.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::Validation("unknown option id in add_options".to_string())
            }
            _ => AppError::Database(e),
        })?;
        Ok(())
    }

    async fn remove_options(&self, event: EventId, ids: &[OptionId]) -> AppResult<()> {
        self.event(event).await?;
        sqlx::query("DELETE FROM event_options WHERE event_id = $1 AND option_id = ANY($2)")
            .bind(event)
            .bind(ids)
            .execute(&self.db.pool)
            .await?;
        Ok(())
    }

    async fn event_options(&self, event: EventId) -> AppResult<Vec<AdditionalOption>> {
        self.event(event).await?;
        let options = sqlx::query_as::<_, AdditionalOption>(
            "SELECT a.id, a.name, a.description, a.price
             FROM event_options eo
             JOIN additional_options a ON a.id = eo.option_id
             WHERE eo.event_id = $1
             ORDER BY a.id",
        )
        .bind(event)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(options)
    }
}
