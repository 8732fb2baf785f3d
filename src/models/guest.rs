use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{EventId, GuestId, SeatId, UserId};

/// An invited person. `seat_id` is exclusive: no two guests reference the
/// same seat at the same time.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Guest {
    pub id: GuestId,
    pub user_id: UserId,
    pub event_id: EventId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub seat_id: Option<SeatId>,
    pub seat_number: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuestInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewGuest {
    pub owner: UserId,
    pub event_id: EventId,
    pub seat_number: i32,
    pub info: GuestInfo,
}
