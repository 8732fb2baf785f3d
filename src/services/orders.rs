//! Ordering ledger: per-user dish orders attached to an event.

use serde::Serialize;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{Dish, DishId, EventId, NewOrder, OrderId, OrderedDish, UserId};
use crate::AppState;

/// An order with its dish and line total.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub id: OrderId,
    pub dish: Dish,
    pub amount: i32,
    pub event: EventId,
    pub line_total: f64,
}

impl OrderLine {
    fn new(order: OrderedDish, dish: Dish) -> Self {
        let line_total = f64::from(order.amount) * dish.price;
        Self {
            id: order.id,
            dish,
            amount: order.amount,
            event: order.event_id,
            line_total,
        }
    }
}

pub async fn create_order(
    state: &AppState,
    caller: UserId,
    dish_id: DishId,
    event_id: EventId,
    amount: i32,
) -> AppResult<OrderLine> {
    if amount < 0 {
        return Err(AppError::Validation(format!(
            "amount must be non-negative, got {amount}"
        )));
    }
    state.store.event(event_id).await?;
    let dish = state.store.dish(dish_id).await?;

    let order = state
        .store
        .create_order(NewOrder {
            user_id: caller,
            dish_id,
            event_id,
            amount,
        })
        .await?;
    info!(order_id = order.id, event_id, dish_id, amount, "dish ordered");
    Ok(OrderLine::new(order, dish))
}

async fn owned_order(state: &AppState, caller: UserId, order_id: OrderId) -> AppResult<OrderedDish> {
    let order = state.store.order(order_id).await?;
    if order.user_id != caller {
        return Err(AppError::Forbidden(
            "you cannot access another user's order".to_string(),
        ));
    }
    Ok(order)
}

pub async fn get_order(state: &AppState, caller: UserId, order_id: OrderId) -> AppResult<OrderLine> {
    let order = owned_order(state, caller, order_id).await?;
    let dish = state.store.dish(order.dish_id).await?;
    Ok(OrderLine::new(order, dish))
}

pub async fn my_orders(state: &AppState, caller: UserId) -> AppResult<Vec<OrderLine>> {
    let orders = state.store.orders_for_user(caller).await?;
    let dishes = state.store.dishes().await?;

    orders
        .into_iter()
        .map(|order| {
            let dish = dishes
                .iter()
                .find(|dish| dish.id == order.dish_id)
                .cloned()
                .ok_or_else(|| AppError::not_found("dish", order.dish_id))?;
            Ok(OrderLine::new(order, dish))
        })
        .collect()
}

pub async fn delete_order(state: &AppState, caller: UserId, order_id: OrderId) -> AppResult<()> {
    owned_order(state, caller, order_id).await?;
    state.store.delete_order(order_id).await
}
