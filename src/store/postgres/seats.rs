use async_trait::async_trait;
use sqlx::PgConnection;
use tracing::{debug, info};

use super::PgStore;
use crate::error::{AppError, AppResult};
use crate::models::{EventId, Seat, SeatId};
use crate::services::inventory;
use crate::store::SeatStore;

const SEAT_COLUMNS: &str = "id, event_id, number, is_engaged, description";

/// Materializes seats `1..=seat_count` for a freshly inserted event. Must run
/// in the transaction that inserted the event.
pub(super) async fn create_inventory(
    conn: &mut PgConnection,
    event_id: EventId,
    seat_count: i32,
) -> AppResult<Vec<Seat>> {
    let seats = sqlx::query_as::<_, Seat>(&format!(
        "INSERT INTO seats (event_id, number)
         SELECT $1, n FROM generate_series(1, $2) AS n
         RETURNING {SEAT_COLUMNS}"
    ))
    .bind(event_id)
    .bind(seat_count)
    .fetch_all(&mut *conn)
    .await?;

    inventory::verify_inventory(event_id, &seats, seat_count)?;
    info!(event_id, seats = seats.len(), "seat inventory created");
    Ok(seats)
}

pub(super) async fn seat_by_number(
    conn: &mut PgConnection,
    event_id: EventId,
    number: i32,
) -> AppResult<Seat> {
    sqlx::query_as::<_, Seat>(&format!(
        "SELECT {SEAT_COLUMNS} FROM seats WHERE event_id = $1 AND number = $2"
    ))
    .bind(event_id)
    .bind(number)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("seat {number} of event {event_id}")))
}

/// Conditional update guarded by the current flag: of two concurrent callers
/// only one sees an affected row, the other waits on the row lock and then
/// finds the seat engaged.
pub(super) async fn occupy(conn: &mut PgConnection, seat_id: SeatId) -> AppResult<Seat> {
    let updated = sqlx::query_as::<_, Seat>(&format!(
        "UPDATE seats SET is_engaged = TRUE
         WHERE id = $1 AND is_engaged = FALSE
         RETURNING {SEAT_COLUMNS}"
    ))
    .bind(seat_id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(seat) = updated {
        debug!(seat_id, number = seat.number, "seat occupied");
        return Ok(seat);
    }

    let number: Option<i32> = sqlx::query_scalar("SELECT number FROM seats WHERE id = $1")
        .bind(seat_id)
        .fetch_optional(&mut *conn)
        .await?;
    match number {
        Some(number) => Err(AppError::SeatUnavailable { number }),
        None => Err(AppError::not_found("seat", seat_id)),
    }
}

pub(super) async fn release(conn: &mut PgConnection, seat_id: SeatId) -> AppResult<Seat> {
    let seat = sqlx::query_as::<_, Seat>(&format!(
        "UPDATE seats SET is_engaged = FALSE WHERE id = $1 RETURNING {SEAT_COLUMNS}"
    ))
    .bind(seat_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found("seat", seat_id))?;
    debug!(seat_id, number = seat.number, "seat released");
    Ok(seat)
}

async fn ensure_event(conn: &mut PgConnection, event_id: EventId) -> AppResult<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)")
        .bind(event_id)
        .fetch_one(&mut *conn)
        .await?;
    if exists {
        Ok(())
    } else {
        Err(AppError::not_found("event", event_id))
    }
}

#[async_trait]
impl SeatStore for PgStore {
    async fn seats(&self, event: EventId) -> AppResult<Vec<Seat>> {
        let mut conn = self.db.pool.acquire().await?;
        ensure_event(&mut conn, event).await?;
        let seats = sqlx::query_as::<_, Seat>(&format!(
            "SELECT {SEAT_COLUMNS} FROM seats WHERE event_id = $1 ORDER BY number"
        ))
        .bind(event)
        .fetch_all(&mut *conn)
        .await?;
        Ok(seats)
    }

    async fn seat_by_number(&self, event: EventId, number: i32) -> AppResult<Seat> {
        let mut conn = self.db.pool.acquire().await?;
        ensure_event(&mut conn, event).await?;
        seat_by_number(&mut conn, event, number).await
    }

    async fn occupy(&self, seat: SeatId) -> AppResult<Seat> {
        let mut conn = self.db.pool.acquire().await?;
        occupy(&mut conn, seat).await
    }

    async fn release(&self, seat: SeatId) -> AppResult<Seat> {
        let mut conn = self.db.pool.acquire().await?;
        release(&mut conn, seat).await
    }
}
