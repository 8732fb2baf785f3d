use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;
use tracing::warn;

use crate::error::AppError;
use crate::models::{User, UserId};
use crate::services::accounts;
use crate::AppState;

/// Caller identity resolved from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

// Bearer (JWT) или Basic (email:password)
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            return from_token(state, token.trim()).await;
        }

        let encoded = auth_header
            .strip_prefix("Basic ")
            .ok_or(AppError::Unauthorized)?;
        let decoded = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|_| AppError::Unauthorized)?;
        let credentials = String::from_utf8(decoded).map_err(|_| AppError::Unauthorized)?;

        let (email, password) = credentials
            .split_once(':')
            .ok_or(AppError::Unauthorized)?;

        let user = accounts::authenticate(state, email, password).await?;
        Ok(user.into())
    }
}

async fn from_token(state: &AppState, token: &str) -> Result<AuthUser, AppError> {
    let claims = accounts::decode_token(&state.config.jwt, token)?;
    let user_id = claims.user_id()?;
    match state.store.user(user_id).await? {
        Some(user) => Ok(user.into()),
        None => {
            warn!(user_id, "token for a user that no longer exists");
            Err(AppError::Unauthorized)
        }
    }
}
