use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{EventId, SeatId};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Seat {
    pub id: SeatId,
    pub event_id: EventId,
    pub number: i32,
    pub is_engaged: bool,
    pub description: String,
}
