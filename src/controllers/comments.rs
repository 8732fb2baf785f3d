use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{Json, Path};
use crate::middleware::AuthUser;
use crate::models::CommentId;
use crate::services::comments;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/comments", get(list_comments).post(create_comment))
        .route("/comments/{id}", get(get_comment).delete(delete_comment))
}

// GET /api/comments
async fn list_comments(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> AppResult<impl IntoResponse> {
    Ok(Json(comments::list_comments(&state).await?))
}

// POST /api/comments
#[derive(Debug, Deserialize, Validate)]
struct CreateCommentRequest {
    #[validate(length(min = 1, max = 5000))]
    text: String,
}

async fn create_comment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate()?;
    let comment = comments::create_comment(&state, user.user_id, &req.text).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

// GET /api/comments/{id}
async fn get_comment(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<CommentId>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(comments::get_comment(&state, id).await?))
}

// DELETE /api/comments/{id}
async fn delete_comment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<CommentId>,
) -> AppResult<impl IntoResponse> {
    comments::delete_comment(&state, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
