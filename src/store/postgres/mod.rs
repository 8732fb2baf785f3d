//! Postgres-backed store.
//!
//! Multi-record operations open one transaction and run the inventory
//! primitives from [`seats`] against it, so a failed step rolls back everything
//! the operation did.

use crate::database::Database;

mod catalog;
mod comments;
mod events;
mod guests;
mod orders;
mod seats;
mod users;

#[derive(Clone)]
pub struct PgStore {
    db: Database,
}

impl PgStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

/// Maps a unique-constraint violation to a validation error carrying `message`.
fn unique_violation(e: sqlx::Error, message: impl FnOnce() -> String) -> crate::error::AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            crate::error::AppError::Validation(message())
        }
        _ => crate::error::AppError::Database(e),
    }
}
