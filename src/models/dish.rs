use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DishId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "dish_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum DishType {
    Cold,
    Warm,
    Snack,
    Salad,
    Drink,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Dish {
    pub id: DishId,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub dish_type: DishType,
}
