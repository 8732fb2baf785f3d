//! Seat inventory manager.
//!
//! An event owns exactly `hall.number_of_seats` seats numbered `1..=N`. The
//! inventory is materialized once, together with the event, and afterwards
//! seats are only toggled between free and engaged.

use std::ops::RangeInclusive;
use tracing::{debug, error, warn};

use crate::error::{AppError, AppResult};
use crate::models::{EventId, Seat, UserId};
use crate::services::events;
use crate::AppState;

/// Seat numbers an inventory of `seat_count` seats must consist of.
pub fn seat_numbers(seat_count: i32) -> RangeInclusive<i32> {
    1..=seat_count
}

/// Checks that `seats` is exactly the inventory `1..=expected` of `event_id`.
///
/// A mismatch means the atomic creation guarantee was broken; it is reported
/// as [`AppError::Inconsistent`] and never repaired here.
pub fn verify_inventory(event_id: EventId, seats: &[Seat], expected: i32) -> AppResult<()> {
    let mut numbers: Vec<i32> = seats
        .iter()
        .filter(|seat| seat.event_id == event_id)
        .map(|seat| seat.number)
        .collect();
    numbers.sort_unstable();

    let count_ok = numbers.len() == seats.len() && numbers.len() == expected.max(0) as usize;
    let numbers_ok = numbers.iter().copied().eq(seat_numbers(expected));

    if count_ok && numbers_ok {
        return Ok(());
    }

    error!(
        event_id,
        expected,
        actual = seats.len(),
        "seat inventory does not match hall capacity"
    );
    Err(AppError::Inconsistent(format!(
        "event {event_id} has {} seats, expected exactly 1..={expected}",
        seats.len()
    )))
}

impl Seat {
    /// Marks the seat engaged, refusing a seat that already is.
    pub fn occupy(&mut self) -> AppResult<()> {
        if self.is_engaged {
            return Err(AppError::SeatUnavailable {
                number: self.number,
            });
        }
        self.is_engaged = true;
        Ok(())
    }

    /// Marks the seat free. Releasing a free seat is a no-op.
    pub fn release(&mut self) {
        self.is_engaged = false;
    }
}

/// Ordered seat listing of an event, visible to the event owner only.
pub async fn list_seats(state: &AppState, caller: UserId, event_id: EventId) -> AppResult<Vec<Seat>> {
    events::owned_event(state, caller, event_id).await?;

    if let Some(cache) = &state.cache {
        match cache.get_seats(event_id).await {
            Ok(Some(seats)) => {
                debug!(event_id, "seat listing served from cache");
                return Ok(seats);
            }
            Ok(None) => {}
            Err(e) => warn!(event_id, error = %e, "seat cache read failed"),
        }
    }

    let seats = state.store.seats(event_id).await?;

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.save_seats(event_id, &seats).await {
            warn!(event_id, error = %e, "seat cache write failed");
        }
    }

    Ok(seats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn inventory(event_id: EventId, numbers: impl IntoIterator<Item = i32>) -> Vec<Seat> {
        numbers
            .into_iter()
            .enumerate()
            .map(|(i, number)| Seat {
                id: i as i64 + 1,
                event_id,
                number,
                is_engaged: false,
                description: String::new(),
            })
            .collect()
    }

    #[test]
    fn exact_inventory_is_accepted() {
        let seats = inventory(1, seat_numbers(5));
        assert!(verify_inventory(1, &seats, 5).is_ok());
    }

    #[test]
    fn empty_hall_has_empty_inventory() {
        assert!(verify_inventory(1, &[], 0).is_ok());
    }

    #[test]
    fn missing_seat_is_inconsistent() {
        let seats = inventory(1, [1, 2, 4, 5]);
        assert!(matches!(
            verify_inventory(1, &seats, 5),
            Err(AppError::Inconsistent(_))
        ));
    }

    #[test]
    fn duplicate_number_is_inconsistent() {
        let seats = inventory(1, [1, 2, 2]);
        assert!(verify_inventory(1, &seats, 3).is_err());
    }

    #[test]
    fn seat_of_another_event_is_inconsistent() {
        let mut seats = inventory(1, seat_numbers(3));
        seats[2].event_id = 2;
        assert!(verify_inventory(1, &seats, 3).is_err());
    }

    #[test]
    fn occupy_is_exclusive_and_release_is_idempotent() {
        let mut seat = inventory(1, [7]).remove(0);

        seat.occupy().unwrap();
        assert!(seat.is_engaged);
        assert!(matches!(
            seat.occupy(),
            Err(AppError::SeatUnavailable { number: 7 })
        ));

        seat.release();
        seat.release();
        assert!(!seat.is_engaged);
        assert!(seat.occupy().is_ok());
    }

    proptest! {
        #[test]
        fn any_permutation_of_numbers_is_accepted(n in 0i32..200, seed in any::<u64>()) {
            let mut numbers: Vec<i32> = seat_numbers(n).collect();
            // deterministic shuffle
            let len = numbers.len();
            if len > 1 {
                for i in 0..len {
                    let j = ((seed.wrapping_mul(i as u64 + 1)) % len as u64) as usize;
                    numbers.swap(i, j);
                }
            }
            let seats = inventory(9, numbers);
            prop_assert!(verify_inventory(9, &seats, n).is_ok());
        }

        #[test]
        fn wrong_capacity_is_rejected(n in 1i32..100, delta in 1i32..5) {
            let seats = inventory(3, seat_numbers(n));
            prop_assert!(verify_inventory(3, &seats, n + delta).is_err());
            prop_assert!(verify_inventory(3, &seats, n - delta).is_err());
        }
    }
}
