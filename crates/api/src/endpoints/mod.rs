//! API endpoints.

mod admin;
mod charts;
mod contents;
mod episodes;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/episodes", episodes::router())
        .nest("/charts", charts::router())
        .nest("/contents", contents::router())
        .nest("/admin", admin::router())
}
