use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{Json, Path};
use crate::middleware::AuthUser;
use crate::models::{EventId, Guest, GuestId, GuestInfo, SeatId, UserId};
use crate::services::guests;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/guest", get(my_guests).post(register_guest))
        .route("/guest/{id}", delete(delete_guest))
        .route("/guest/{id}/change-seat", post(change_seat))
        .route("/guest/{id}/make-seat-free", get(make_seat_free))
}

#[derive(Debug, Serialize)]
pub struct GuestView {
    pub id: GuestId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub seat: Option<SeatId>,
    pub seat_number: Option<i32>,
    pub event: EventId,
    pub user: UserId,
}

impl From<Guest> for GuestView {
    fn from(guest: Guest) -> Self {
        Self {
            id: guest.id,
            first_name: guest.first_name,
            last_name: guest.last_name,
            email: guest.email,
            seat: guest.seat_id,
            seat_number: guest.seat_number,
            event: guest.event_id,
            user: guest.user_id,
        }
    }
}

// GET /api/guest
async fn my_guests(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let list = guests::my_guests(&state, user.user_id).await?;
    let list: Vec<GuestView> = list.into_iter().map(GuestView::from).collect();
    Ok(Json(list))
}

// POST /api/guest
#[derive(Debug, Deserialize, Validate)]
struct RegisterGuestRequest {
    event: EventId,
    /// Seat number inside the event, not a seat id.
    seat: i32,
    #[validate(length(min = 1, max = 150))]
    first_name: String,
    #[validate(length(min = 1, max = 150))]
    last_name: String,
    #[validate(email)]
    email: Option<String>,
}

async fn register_guest(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<RegisterGuestRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate()?;
    let guest = guests::register_guest(
        &state,
        user.user_id,
        req.event,
        req.seat,
        GuestInfo {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(GuestView::from(guest))))
}

// POST /api/guest/{id}/change-seat
#[derive(Debug, Deserialize)]
struct ChangeSeatRequest {
    seat_number: i32,
    event_id: Option<EventId>,
}

async fn change_seat(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<GuestId>,
    Json(req): Json<ChangeSeatRequest>,
) -> AppResult<impl IntoResponse> {
    let guest = guests::change_seat(&state, user.user_id, id, req.seat_number, req.event_id).await?;
    Ok(Json(GuestView::from(guest)))
}

#[derive(Debug, Serialize)]
struct Detail {
    detail: &'static str,
}

// GET /api/guest/{id}/make-seat-free
async fn make_seat_free(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<GuestId>,
) -> AppResult<impl IntoResponse> {
    guests::free_seat(&state, user.user_id, id).await?;
    Ok(Json(Detail {
        detail: "Seat is free",
    }))
}

// DELETE /api/guest/{id}
async fn delete_guest(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<GuestId>,
) -> AppResult<impl IntoResponse> {
    guests::delete_guest(&state, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
