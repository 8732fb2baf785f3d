//! Event pricing: the caller's dish orders layered on the event's shared
//! option total.

use serde::Serialize;

use crate::error::AppResult;
use crate::models::{EventId, UserId};
use crate::store::BanquetStore;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub dishes: f64,
    pub options: f64,
    pub total: f64,
}

/// Total price of `event_id` as seen by `user`: the sum of `amount * price` of
/// that user's ordered dishes plus the price of every option attached to the
/// event. Both parts are zero, never absent, when nothing is ordered or
/// selected.
pub async fn compute_total_price(
    store: &dyn BanquetStore,
    event_id: EventId,
    user: UserId,
) -> AppResult<PriceBreakdown> {
    let (dishes, options) = futures::try_join!(
        store.dish_total(event_id, user),
        store.options_total(event_id)
    )?;
    Ok(PriceBreakdown {
        dishes,
        options,
        total: dishes + options,
    })
}

/// Number of guest records of the event, seated or not.
pub async fn guest_count(store: &dyn BanquetStore, event_id: EventId) -> AppResult<i64> {
    store.guest_count(event_id).await
}
