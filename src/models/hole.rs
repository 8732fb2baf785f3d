use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::HoleId;

/// A hall. `number_of_seats` fixes the size of every event inventory made for it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Hole {
    pub id: HoleId,
    pub name: String,
    pub description: String,
    pub number_of_seats: i32,
}
