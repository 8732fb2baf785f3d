use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{DishId, EventId, OrderId, UserId};

/// A quantity of a catalog dish ordered by one user for one event.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct OrderedDish {
    pub id: OrderId,
    pub user_id: UserId,
    pub dish_id: DishId,
    pub event_id: EventId,
    pub amount: i32,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub dish_id: DishId,
    pub event_id: EventId,
    pub amount: i32,
}
