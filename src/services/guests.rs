//! Guest registry: binds guests to seats of an event's inventory.

use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{EventId, Guest, GuestId, GuestInfo, NewGuest, UserId};
use crate::services::events;
use crate::AppState;

/// Loads the guest and checks that `caller` registered it.
pub async fn owned_guest(state: &AppState, caller: UserId, guest_id: GuestId) -> AppResult<Guest> {
    let guest = state.store.guest(guest_id).await?;
    if guest.user_id != caller {
        warn!(guest_id, caller, "access to another user's guest refused");
        return Err(AppError::Forbidden(
            "you cannot manage another user's guest".to_string(),
        ));
    }
    Ok(guest)
}

fn log_conflict(result: &AppResult<Guest>, event_id: EventId, seat_number: i32) {
    if let Err(AppError::SeatUnavailable { .. }) = result {
        warn!(event_id, seat_number, "seat already taken");
    }
}

/// Seats a new guest on seat `seat_number` of the caller's event. Either the
/// seat is occupied and the guest exists, or neither happened.
pub async fn register_guest(
    state: &AppState,
    caller: UserId,
    event_id: EventId,
    seat_number: i32,
    info: GuestInfo,
) -> AppResult<Guest> {
    events::owned_event(state, caller, event_id).await?;

    let result = state
        .store
        .register_guest(NewGuest {
            owner: caller,
            event_id,
            seat_number,
            info,
        })
        .await;
    log_conflict(&result, event_id, seat_number);
    let guest = result?;

    state.invalidate_seats(event_id).await;
    info!(guest_id = guest.id, event_id, seat_number, "guest seated");
    Ok(guest)
}

/// Moves the guest to seat `seat_number` of its event.
///
/// The seat held before is left engaged unless the
/// `release_previous_seat_on_change` feature flag is on; a separate
/// `free_seat` call is the regular way to give it back.
pub async fn change_seat(
    state: &AppState,
    caller: UserId,
    guest_id: GuestId,
    seat_number: i32,
    event_id: Option<EventId>,
) -> AppResult<Guest> {
    let guest = owned_guest(state, caller, guest_id).await?;
    if let Some(event_id) = event_id {
        if event_id != guest.event_id {
            return Err(AppError::Validation(format!(
                "guest {guest_id} belongs to event {}, not {event_id}",
                guest.event_id
            )));
        }
    }

    // TODO: flip release_previous_seat_on_change to default on once clients
    // stop relying on the old seat staying engaged after a change.
    let release_previous = state.config.features.release_previous_seat_on_change;
    let result = state
        .store
        .change_seat(guest_id, seat_number, release_previous)
        .await;
    log_conflict(&result, guest.event_id, seat_number);
    let updated = result?;

    state.invalidate_seats(guest.event_id).await;
    info!(
        guest_id,
        from = ?guest.seat_number,
        to = seat_number,
        released_previous = release_previous,
        "guest moved"
    );
    Ok(updated)
}

/// Gives the guest's seat back to the inventory. A guest without a seat is left
/// as is.
pub async fn free_seat(state: &AppState, caller: UserId, guest_id: GuestId) -> AppResult<Guest> {
    let guest = owned_guest(state, caller, guest_id).await?;
    let updated = state.store.free_seat(guest_id).await?;
    state.invalidate_seats(guest.event_id).await;
    info!(guest_id, seat = ?guest.seat_number, "seat freed");
    Ok(updated)
}

/// Removes the guest; its seat is released in the same unit of work.
pub async fn delete_guest(state: &AppState, caller: UserId, guest_id: GuestId) -> AppResult<()> {
    let guest = owned_guest(state, caller, guest_id).await?;
    state.store.delete_guest(guest_id).await?;
    state.invalidate_seats(guest.event_id).await;
    Ok(())
}

pub async fn list_guests(state: &AppState, caller: UserId, event_id: EventId) -> AppResult<Vec<Guest>> {
    events::owned_event(state, caller, event_id).await?;
    state.store.guests(event_id).await
}

pub async fn my_guests(state: &AppState, caller: UserId) -> AppResult<Vec<Guest>> {
    state.store.guests_for_owner(caller).await
}
