//! Event lifecycle and the add-on option set of each event.

use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{AdditionalOption, Event, EventId, NewEvent, OptionId, UserId};
use crate::store::EventFilter;
use crate::AppState;

/// Creates the event together with its seat inventory. The owner is whoever
/// `new.owner` names; callers set it from the authenticated identity.
pub async fn create_event(state: &AppState, new: NewEvent) -> AppResult<Event> {
    let (event, seats) = state.store.create_event(new).await?;
    info!(
        event_id = event.id,
        owner = event.user_id,
        hole_id = event.hole_id,
        seats = seats.len(),
        "event booked"
    );
    Ok(event)
}

/// Loads the event and checks that `caller` owns it.
pub async fn owned_event(state: &AppState, caller: UserId, event_id: EventId) -> AppResult<Event> {
    let event = state.store.event(event_id).await?;
    if !event.is_owned_by(caller) {
        warn!(event_id, caller, "access to another user's event refused");
        return Err(AppError::Forbidden(
            "you cannot access another user's event".to_string(),
        ));
    }
    Ok(event)
}

pub async fn list_events(state: &AppState, caller: UserId, filter: &EventFilter) -> AppResult<Vec<Event>> {
    state.store.events_for_owner(caller, filter).await
}

pub async fn delete_event(state: &AppState, caller: UserId, event_id: EventId) -> AppResult<()> {
    owned_event(state, caller, event_id).await?;
    state.store.delete_event(event_id).await?;
    state.invalidate_seats(event_id).await;
    info!(event_id, "event deleted with its seats, guests and orders");
    Ok(())
}

/// `Active -> Passed`. Idempotent.
pub async fn mark_passed(state: &AppState, caller: UserId, event_id: EventId) -> AppResult<Event> {
    owned_event(state, caller, event_id).await?;
    let event = state.store.mark_passed(event_id).await?;
    info!(event_id, "event marked as passed");
    Ok(event)
}

async fn ensure_options_exist(state: &AppState, ids: &[OptionId]) -> AppResult<()> {
    let missing = state.store.missing_options(ids).await?;
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(format!("unknown option ids: {missing:?}")))
    }
}

/// Adds options to the event's set. Already present ids are ignored.
pub async fn add_options(
    state: &AppState,
    caller: UserId,
    event_id: EventId,
    ids: &[OptionId],
) -> AppResult<Vec<AdditionalOption>> {
    owned_event(state, caller, event_id).await?;
    ensure_options_exist(state, ids).await?;
    state.store.add_options(event_id, ids).await?;
    state.store.event_options(event_id).await
}

/// Removes options from the event's set. Absent ids are ignored.
pub async fn remove_options(
    state: &AppState,
    caller: UserId,
    event_id: EventId,
    ids: &[OptionId],
) -> AppResult<Vec<AdditionalOption>> {
    owned_event(state, caller, event_id).await?;
    ensure_options_exist(state, ids).await?;
    state.store.remove_options(event_id, ids).await?;
    state.store.event_options(event_id).await
}
