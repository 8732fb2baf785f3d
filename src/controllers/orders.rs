use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{Json, Path};
use crate::middleware::AuthUser;
use crate::models::{DishId, EventId, OrderId};
use crate::services::orders;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/order", post(create_order))
        .route("/order/my-ordered-dishes", get(my_ordered_dishes))
        .route("/order/{id}", get(get_order).delete(delete_order))
}

// POST /api/order
#[derive(Debug, Deserialize, Validate)]
struct CreateOrderRequest {
    dish: DishId,
    #[validate(range(min = 0))]
    amount: i32,
    event: EventId,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateOrderRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate()?;
    let line = orders::create_order(&state, user.user_id, req.dish, req.event, req.amount).await?;
    Ok((StatusCode::CREATED, Json(line)))
}

// GET /api/order/my-ordered-dishes
async fn my_ordered_dishes(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> AppResult<impl IntoResponse> {
    Ok(Json(orders::my_orders(&state, user.user_id).await?))
}

// GET /api/order/{id}
async fn get_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<OrderId>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(orders::get_order(&state, user.user_id, id).await?))
}

// DELETE /api/order/{id}
async fn delete_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<OrderId>,
) -> AppResult<impl IntoResponse> {
    orders::delete_order(&state, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
