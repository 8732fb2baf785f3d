use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::controllers::guests::GuestView;
use crate::error::AppResult;
use crate::extract::{Json, Path, Query};
use crate::middleware::AuthUser;
use crate::models::{
    Event, EventId, EventStatus, EventType, HoleId, NewEvent, OptionId, Seat, SeatId, UserId,
};
use crate::services::{events, guests, inventory, invitations, pricing};
use crate::store::EventFilter;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", post(create_event))
        .route("/events/my-events", get(my_events))
        .route("/events/{id}", get(get_event).delete(delete_event))
        .route("/events/{id}/event-seats", get(event_seats))
        .route("/events/{id}/event-guests", get(event_guests))
        .route("/events/{id}/total-price", get(total_price))
        .route("/events/{id}/add-options", patch(add_options))
        .route("/events/{id}/delete-options", patch(delete_options))
        .route("/events/{id}/mark-passed", post(mark_passed))
        .route("/events/{id}/send-invitations", post(send_invitations))
}

/* ---------- views ---------- */

#[derive(Debug, Serialize)]
struct EventDetail {
    id: EventId,
    user: UserId,
    hole: HoleId,
    description: String,
    event_type: EventType,
    status: EventStatus,
    add_options: Vec<OptionId>,
    date_created: DateTime<Utc>,
    date_planned: Option<NaiveDate>,
    is_passed: bool,
}

async fn event_detail(state: &AppState, event: Event) -> AppResult<EventDetail> {
    let add_options = state
        .store
        .event_options(event.id)
        .await?
        .into_iter()
        .map(|option| option.id)
        .collect();
    Ok(EventDetail {
        id: event.id,
        user: event.user_id,
        hole: event.hole_id,
        status: event.status(),
        description: event.description,
        event_type: event.event_type,
        add_options,
        date_created: event.date_created,
        date_planned: event.date_planned,
        is_passed: event.is_passed,
    })
}

#[derive(Debug, Serialize)]
struct EventListItem {
    id: EventId,
    event_type: EventType,
    guest_count: i64,
    date_planned: Option<NaiveDate>,
    total_price: f64,
    is_passed: bool,
}

#[derive(Debug, Serialize)]
struct SeatView {
    id: SeatId,
    number: i32,
    is_engaged: bool,
    description: String,
}

impl From<Seat> for SeatView {
    fn from(seat: Seat) -> Self {
        Self {
            id: seat.id,
            number: seat.number,
            is_engaged: seat.is_engaged,
            description: seat.description,
        }
    }
}

/* ---------- EVENTS ---------- */

// POST /api/events
#[derive(Debug, Deserialize, Validate)]
struct CreateEventRequest {
    #[validate(range(min = 1))]
    hole: HoleId,
    event_type: EventType,
    #[serde(default)]
    #[validate(length(max = 1000))]
    description: String,
    date_planned: Option<NaiveDate>,
}

async fn create_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateEventRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate()?;
    let event = events::create_event(
        &state,
        NewEvent {
            owner: user.user_id,
            hole_id: req.hole,
            description: req.description,
            event_type: req.event_type,
            date_planned: req.date_planned,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(event_detail(&state, event).await?)))
}

// GET /api/events/my-events
#[derive(Debug, Deserialize)]
struct MyEventsQuery {
    event_type: Option<EventType>,
    is_passed: Option<bool>,
    search: Option<String>,
}

async fn my_events(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(params): Query<MyEventsQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = EventFilter {
        event_type: params.event_type,
        is_passed: params.is_passed,
        search: params.search.filter(|s| !s.trim().is_empty()),
    };
    let list = events::list_events(&state, user.user_id, &filter).await?;

    let mut items = Vec::with_capacity(list.len());
    for event in list {
        let guest_count = pricing::guest_count(state.store.as_ref(), event.id).await?;
        let price = pricing::compute_total_price(state.store.as_ref(), event.id, user.user_id).await?;
        items.push(EventListItem {
            id: event.id,
            event_type: event.event_type,
            guest_count,
            date_planned: event.date_planned,
            total_price: price.total,
            is_passed: event.is_passed,
        });
    }
    Ok(Json(items))
}

// GET /api/events/{id}
async fn get_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<EventId>,
) -> AppResult<impl IntoResponse> {
    let event = events::owned_event(&state, user.user_id, id).await?;
    Ok(Json(event_detail(&state, event).await?))
}

// DELETE /api/events/{id}
async fn delete_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<EventId>,
) -> AppResult<impl IntoResponse> {
    events::delete_event(&state, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/events/{id}/mark-passed
async fn mark_passed(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<EventId>,
) -> AppResult<impl IntoResponse> {
    let event = events::mark_passed(&state, user.user_id, id).await?;
    Ok(Json(event_detail(&state, event).await?))
}

/* ---------- SEATS / GUESTS / PRICE ---------- */

// GET /api/events/{id}/event-seats
async fn event_seats(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<EventId>,
) -> AppResult<impl IntoResponse> {
    let seats = inventory::list_seats(&state, user.user_id, id).await?;
    let seats: Vec<SeatView> = seats.into_iter().map(SeatView::from).collect();
    Ok(Json(seats))
}

// GET /api/events/{id}/event-guests
async fn event_guests(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<EventId>,
) -> AppResult<impl IntoResponse> {
    let list = guests::list_guests(&state, user.user_id, id).await?;
    let list: Vec<GuestView> = list.into_iter().map(GuestView::from).collect();
    Ok(Json(list))
}

#[derive(Debug, Serialize)]
struct TotalPriceResponse {
    price: f64,
}

// GET /api/events/{id}/total-price
async fn total_price(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<EventId>,
) -> AppResult<impl IntoResponse> {
    events::owned_event(&state, user.user_id, id).await?;
    let price = pricing::compute_total_price(state.store.as_ref(), id, user.user_id).await?;
    Ok(Json(TotalPriceResponse { price: price.total }))
}

/* ---------- OPTIONS ---------- */

#[derive(Debug, Deserialize, Serialize)]
struct OptionsChange {
    #[serde(default)]
    add_options: Vec<OptionId>,
}

// PATCH /api/events/{id}/add-options
async fn add_options(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<EventId>,
    Json(req): Json<OptionsChange>,
) -> AppResult<impl IntoResponse> {
    let options = events::add_options(&state, user.user_id, id, &req.add_options).await?;
    Ok(Json(OptionsChange {
        add_options: options.into_iter().map(|option| option.id).collect(),
    }))
}

// PATCH /api/events/{id}/delete-options
async fn delete_options(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<EventId>,
    Json(req): Json<OptionsChange>,
) -> AppResult<impl IntoResponse> {
    let options = events::remove_options(&state, user.user_id, id, &req.add_options).await?;
    Ok(Json(OptionsChange {
        add_options: options.into_iter().map(|option| option.id).collect(),
    }))
}

/* ---------- INVITATIONS ---------- */

#[derive(Debug, Deserialize, Validate)]
struct InvitationRequest {
    #[validate(length(min = 1, max = 200))]
    man_fullname: String,
    #[validate(length(min = 1, max = 200))]
    women_fullname: String,
}

#[derive(Debug, Serialize)]
struct InvitationResponse {
    sent: usize,
}

// POST /api/events/{id}/send-invitations
async fn send_invitations(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<EventId>,
    Json(req): Json<InvitationRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate()?;
    let sent = invitations::send_invitations(
        &state,
        user.user_id,
        id,
        &req.women_fullname,
        &req.man_fullname,
    )
    .await?;
    Ok(Json(InvitationResponse { sent }))
}
