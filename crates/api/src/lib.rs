//! HTTP layer for yatube-rs.
//!
//! - **Endpoints**: feeds, posts, groups, follows, likes and search
//! - **Extractors**: authenticated user and client address
//! - **Middleware**: token resolution and shared state
//! - **Render**: HTML fragments embedded in JSON answers
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod render;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};
use tower_http::trace::TraceLayer;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};

/// Assemble the application: routes, token resolution and request tracing.
pub fn app(state: AppState) -> Router {
    router()
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
