use axum::{
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path};
use crate::models::{Hole, HoleId};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/hole", get(list_holes))
        .route("/hole/{id}", get(get_hole))
        .route("/dishes", get(list_dishes))
        .route("/events/all-options", get(list_options))
}

// Каталог залов читается через кеш, при ошибке кеша идем в хранилище
async fn cached_holes(state: &AppState) -> AppResult<Vec<Hole>> {
    if let Some(cache) = &state.cache {
        match cache.get_holes().await {
            Ok(Some(holes)) => return Ok(holes),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "hole cache read failed"),
        }
    }

    let holes = state.store.holes().await?;

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.save_holes(&holes).await {
            warn!(error = %e, "hole cache write failed");
        }
    }
    Ok(holes)
}

// GET /api/hole
async fn list_holes(State(state): State<Arc<AppState>>) -> AppResult<impl IntoResponse> {
    Ok(Json(cached_holes(&state).await?))
}

// GET /api/hole/{id}
async fn get_hole(
    State(state): State<Arc<AppState>>,
    Path(id): Path<HoleId>,
) -> AppResult<impl IntoResponse> {
    let hole = cached_holes(&state)
        .await?
        .into_iter()
        .find(|hole| hole.id == id)
        .ok_or_else(|| AppError::not_found("hole", id))?;
    Ok(Json(hole))
}

// GET /api/dishes
async fn list_dishes(State(state): State<Arc<AppState>>) -> AppResult<impl IntoResponse> {
    Ok(Json(state.store.dishes().await?))
}

// GET /api/events/all-options
async fn list_options(State(state): State<Arc<AppState>>) -> AppResult<impl IntoResponse> {
    Ok(Json(state.store.options().await?))
}
