use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::Json;
use crate::middleware::AuthUser;
use crate::models::{User, UserId};
use crate::services::accounts;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/token", post(token))
        .route("/profile", get(profile))
}

// POST /api/register
#[derive(Debug, Deserialize, Validate)]
struct RegisterRequest {
    #[validate(email)]
    email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    password: String,
    #[validate(length(min = 1, max = 150))]
    first_name: String,
    #[validate(length(min = 1, max = 150))]
    last_name: String,
}

#[derive(Debug, Serialize)]
struct RegisteredUser {
    id: UserId,
    email: String,
    first_name: String,
    last_name: String,
}

impl From<User> for RegisteredUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate()?;
    let user = accounts::register(
        &state,
        req.email.trim().to_string(),
        req.password,
        req.first_name,
        req.last_name,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(RegisteredUser::from(user))))
}

// POST /api/token
#[derive(Debug, Deserialize)]
struct TokenRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    access: String,
    token_type: &'static str,
}

async fn token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TokenRequest>,
) -> AppResult<impl IntoResponse> {
    let user = accounts::authenticate(&state, req.email.trim(), &req.password).await?;
    let access = accounts::issue_token(&state.config.jwt, &user)?;
    Ok(Json(TokenResponse {
        access,
        token_type: "Bearer",
    }))
}

// GET /api/profile
#[derive(Debug, Serialize)]
struct ProfileView {
    first_name: String,
    last_name: String,
    email: String,
}

async fn profile(user: AuthUser) -> AppResult<impl IntoResponse> {
    Ok(Json(ProfileView {
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
    }))
}
