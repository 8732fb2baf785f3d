//! User registration and credentials: bcrypt password hashes and HS256 access
//! tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User, UserId};
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> AppResult<UserId> {
        self.sub.parse().map_err(|_| AppError::Unauthorized)
    }
}

async fn hash_password(password: String, cost: u32) -> AppResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("password check failed: {e}")))
}

pub async fn register(
    state: &AppState,
    email: String,
    password: String,
    first_name: String,
    last_name: String,
) -> AppResult<User> {
    let password_hash = hash_password(password, state.config.auth.bcrypt_cost).await?;
    let user = state
        .store
        .create_user(NewUser {
            email,
            password_hash,
            first_name,
            last_name,
        })
        .await?;
    info!(user_id = user.id, "user registered");
    Ok(user)
}

/// Returns the user whose email and password match, or `Unauthorized`.
pub async fn authenticate(state: &AppState, email: &str, password: &str) -> AppResult<User> {
    let Some(user) = state.store.user_by_email(email).await? else {
        warn!("login attempt for unknown email");
        return Err(AppError::Unauthorized);
    };
    if !verify_password(password.to_string(), user.password_hash.clone()).await? {
        warn!(user_id = user.id, "wrong password");
        return Err(AppError::Unauthorized);
    }
    Ok(user)
}

pub fn issue_token(config: &JwtConfig, user: &User) -> AppResult<String> {
    let exp = (Utc::now() + Duration::hours(config.expires_in_hours)).timestamp();
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        exp: exp.max(0) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token encoding failed: {e}")))
}

pub fn decode_token(config: &JwtConfig, token: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            expires_in_hours: 1,
        }
    }

    fn user() -> User {
        User {
            id: 17,
            email: "host@example.com".to_string(),
            password_hash: String::new(),
            first_name: "Ana".to_string(),
            last_name: "Rusu".to_string(),
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn issued_token_identifies_the_user() {
        let config = jwt_config("secret");
        let token = issue_token(&config, &user()).unwrap();
        let claims = decode_token(&config, &token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 17);
        assert_eq!(claims.email, "host@example.com");
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = issue_token(&jwt_config("one"), &user()).unwrap();
        assert!(matches!(
            decode_token(&jwt_config("two"), &token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = JwtConfig {
            secret: "secret".to_string(),
            expires_in_hours: -2,
        };
        let token = issue_token(&config, &user()).unwrap();
        assert!(decode_token(&config, &token).is_err());
    }

    #[tokio::test]
    async fn password_hash_round_trip() {
        let hash = hash_password("s3cret".to_string(), 4).await.unwrap();
        assert!(verify_password("s3cret".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("other".to_string(), hash).await.unwrap());
    }
}
