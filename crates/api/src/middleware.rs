//! API middleware.

use anichart_common::AppError;
use anichart_core::{ChartService, VoteService};
use axum::{body::Body, http::Request, middleware::Next, response::Response};

use crate::extractors::AuthenticatedMember;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Vote casting and episode status.
    pub vote_service: VoteService,
    /// Weekly close and chart queries.
    pub chart_service: ChartService,
}

impl AppState {
    /// Create the shared state.
    #[must_use]
    pub const fn new(vote_service: VoteService, chart_service: ChartService) -> Self {
        Self {
            vote_service,
            chart_service,
        }
    }
}

/// Reject requests whose authenticated member is not an administrator.
pub async fn require_admin(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let is_admin = req
        .extensions()
        .get::<AuthenticatedMember>()
        .is_some_and(|member| member.is_admin);

    if !is_admin {
        tracing::debug!(path = %req.uri().path(), "Admin route denied");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(req).await)
}
