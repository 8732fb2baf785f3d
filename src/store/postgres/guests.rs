use async_trait::async_trait;
use sqlx::PgConnection;
use tracing::info;

use super::{seats, PgStore};
use crate::error::{AppError, AppResult};
use crate::models::{EventId, Guest, GuestId, NewGuest, SeatId, UserId};
use crate::store::GuestStore;

const GUEST_SELECT: &str = "SELECT g.id, g.user_id, g.event_id, g.first_name, g.last_name, g.email,
            g.seat_id, s.number AS seat_number
     FROM guests g
     LEFT JOIN seats s ON s.id = g.seat_id";

async fn fetch_guest(conn: &mut PgConnection, id: GuestId) -> AppResult<Guest> {
    sqlx::query_as::<_, Guest>(&format!("{GUEST_SELECT} WHERE g.id = $1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::not_found("guest", id))
}

/// Reads the guest and locks its row for the rest of the transaction.
async fn lock_guest(conn: &mut PgConnection, id: GuestId) -> AppResult<Guest> {
    sqlx::query_as::<_, Guest>(&format!("{GUEST_SELECT} WHERE g.id = $1 FOR UPDATE OF g"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::not_found("guest", id))
}

async fn set_seat(conn: &mut PgConnection, id: GuestId, seat: Option<SeatId>) -> AppResult<()> {
    sqlx::query("UPDATE guests SET seat_id = $2 WHERE id = $1")
        .bind(id)
        .bind(seat)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[async_trait]
impl GuestStore for PgStore {
    async fn register_guest(&self, new: NewGuest) -> AppResult<Guest> {
        let mut tx = self.db.pool.begin().await?;

        let seat = seats::seat_by_number(&mut tx, new.event_id, new.seat_number).await?;
        seats::occupy(&mut tx, seat.id).await?;

        let id: GuestId = sqlx::query_scalar(
            "INSERT INTO guests (user_id, event_id, first_name, last_name, email, seat_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(new.owner)
        .bind(new.event_id)
        .bind(&new.info.first_name)
        .bind(&new.info.last_name)
        .bind(&new.info.email)
        .bind(seat.id)
        .fetch_one(&mut *tx)
        .await?;

        let guest = fetch_guest(&mut tx, id).await?;
        tx.commit().await?;
        info!(guest_id = id, event_id = new.event_id, seat = seat.number, "guest registered");
        Ok(guest)
    }

    async fn change_seat(
        &self,
        guest: GuestId,
        seat_number: i32,
        release_previous: bool,
    ) -> AppResult<Guest> {
        let mut tx = self.db.pool.begin().await?;
        let current = lock_guest(&mut tx, guest).await?;

        let seat = seats::seat_by_number(&mut tx, current.event_id, seat_number).await?;
        if current.seat_id == Some(seat.id) {
            tx.commit().await?;
            return Ok(current);
        }

        seats::occupy(&mut tx, seat.id).await?;
        if release_previous {
            if let Some(previous) = current.seat_id {
                seats::release(&mut tx, previous).await?;
            }
        }
        set_seat(&mut tx, guest, Some(seat.id)).await?;

        let updated = fetch_guest(&mut tx, guest).await?;
        tx.commit().await?;
        info!(guest_id = guest, from = ?current.seat_number, to = seat.number, "guest changed seat");
        Ok(updated)
    }

    async fn free_seat(&self, guest: GuestId) -> AppResult<Guest> {
        let mut tx = self.db.pool.begin().await?;
        let current = lock_guest(&mut tx, guest).await?;

        if let Some(seat) = current.seat_id {
            seats::release(&mut tx, seat).await?;
            set_seat(&mut tx, guest, None).await?;
        }

        let updated = fetch_guest(&mut tx, guest).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_guest(&self, guest: GuestId) -> AppResult<Guest> {
        let mut tx = self.db.pool.begin().await?;
        let current = lock_guest(&mut tx, guest).await?;

        if let Some(seat) = current.seat_id {
            seats::release(&mut tx, seat).await?;
        }
        sqlx::query("DELETE FROM guests WHERE id = $1")
            .bind(guest)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(guest_id = guest, seat = ?current.seat_number, "guest deleted");
        Ok(current)
    }

    async fn guest(&self, id: GuestId) -> AppResult<Guest> {
        let mut conn = self.db.pool.acquire().await?;
        fetch_guest(&mut conn, id).await
    }

    async fn guests(&self, event: EventId) -> AppResult<Vec<Guest>> {
        let guests = sqlx::query_as::<_, Guest>(&format!(
            "{GUEST_SELECT} WHERE g.event_id = $1 ORDER BY g.id"
        ))
        .bind(event)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(guests)
    }

    async fn guests_for_owner(&self, owner: UserId) -> AppResult<Vec<Guest>> {
        let guests = sqlx::query_as::<_, Guest>(&format!(
            "{GUEST_SELECT} WHERE g.user_id = $1 ORDER BY g.id"
        ))
        .bind(owner)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(guests)
    }

    async fn guest_count(&self, event: EventId) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM guests WHERE event_id = $1")
            .bind(event)
            .fetch_one(&self.db.pool)
            .await?;
        Ok(count)
    }
}
