//! HTTP API layer for anichart.
//!
//! - **Endpoints**: voting, charts, rank history and admin actions
//! - **Extractors**: voter identity from the auth layer or the voter cookie
//! - **Middleware**: shared state and admin gate
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use extractors::{AuthenticatedMember, CurrentVoter, VOTER_COOKIE};
pub use middleware::AppState;
