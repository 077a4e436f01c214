//! HTTP endpoints.

mod about;
mod auth;
mod follow;
mod groups;
mod likes;
mod posts;
mod profiles;
mod search;

use axum::{
    Json, Router,
    extract::OriginalUri,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::middleware::AppState;

/// `?page=` query shared by every listing.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: Option<u64>,
}

impl PageQuery {
    /// Requested page, defaulting to the first.
    #[must_use]
    pub fn number(&self) -> u64 {
        self.page.unwrap_or(1)
    }
}

/// Create the router with every page and action.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(posts::router())
        .merge(groups::router())
        .merge(profiles::router())
        .merge(follow::router())
        .merge(likes::router())
        .merge(search::router())
        .merge(about::router())
        .nest("/auth", auth::router())
        .fallback(not_found)
}

/// 404 for anything no route matched.
async fn not_found(OriginalUri(uri): OriginalUri) -> Response {
    tracing::debug!(path = %uri.path(), "No route matched");

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": {
                "code": "NOT_FOUND",
                "message": "Page not found",
            },
            "path": uri.path(),
        })),
    )
        .into_response()
}
