pub mod accounts;
pub mod catalog;
pub mod comments;
pub mod events;
pub mod guests;
pub mod orders;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(accounts::routes())
        .merge(catalog::routes())
        .merge(comments::routes())
        .merge(events::routes())
        .merge(guests::routes())
        .merge(orders::routes())
}
