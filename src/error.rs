//! Error type shared by the store, the services and the HTTP handlers.
//!
//! Seat and guest errors travel unchanged up to the handler, where
//! [`IntoResponse`] turns them into a status code and a JSON body.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("seat {number} is already occupied")]
    SeatUnavailable { number: i32 },

    #[error("{0}")]
    Forbidden(String),

    #[error("authentication credentials were not provided or are invalid")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    /// An invariant that atomic creation should have guaranteed does not hold.
    #[error("inconsistent state: {0}")]
    Inconsistent(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("mail error: {0}")]
    Mail(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("{resource} {id}"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SeatUnavailable { .. } => StatusCode::CONFLICT,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Inconsistent(_)
            | AppError::Database(_)
            | AppError::Cache(_)
            | AppError::Mail(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::SeatUnavailable { .. } => "SEAT_UNAVAILABLE",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Inconsistent(_) => "INCONSISTENT_STATE",
            AppError::Database(_)
            | AppError::Cache(_)
            | AppError::Mail(_)
            | AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

// Malformed bodies, paths and query strings are client input errors like any other
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    code: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match &self {
            AppError::Inconsistent(_) => {
                tracing::error!(error = %self, "invariant violated");
                "internal server error".to_string()
            }
            AppError::Database(_) | AppError::Cache(_) | AppError::Mail(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorBody {
            error,
            code: self.code(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_http_statuses() {
        assert_eq!(AppError::not_found("seat", 7).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::SeatUnavailable { number: 3 }.status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Forbidden("nope".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Inconsistent("seat count".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn internal_details_are_not_leaked() {
        let response = AppError::Inconsistent("event 4 has 3 seats, expected 5".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "INCONSISTENT_STATE");
        assert_eq!(body["error"], "internal server error");
    }

    #[test]
    fn conflict_message_names_the_seat() {
        let err = AppError::SeatUnavailable { number: 12 };
        assert_eq!(err.to_string(), "seat 12 is already occupied");
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        use axum::extract::FromRequest;

        let request = axum::http::Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(r#"{"add_options":["x"]}"#))
            .unwrap();
        let rejection = Json::<std::collections::HashMap<String, Vec<i64>>>::from_request(request, &())
            .await
            .err()
            .unwrap();

        let err = AppError::from(rejection);
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
