use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::OptionId;

/// Priced add-on selectable per event (decoration, music, photographer...).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct AdditionalOption {
    pub id: OptionId,
    pub name: String,
    pub description: String,
    pub price: f64,
}
