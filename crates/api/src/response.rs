//! API response types.

use axum::{
    Json,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use yatube_core::PageContext;

/// A page: the shared context merged with page-specific data.
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    #[serde(flatten)]
    pub context: PageContext,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> PageResponse<T> {
    /// Create a page response.
    pub const fn new(context: PageContext, data: T) -> Self {
        Self { context, data }
    }
}

impl<T: Serialize> IntoResponse for PageResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// `303 See Other` to `location`.
#[must_use]
pub fn see_other(location: &str) -> Response {
    Redirect::to(location).into_response()
}

/// Location of a user's profile page.
#[must_use]
pub fn profile_path(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

/// Location of a post page.
#[must_use]
pub fn post_path(post_id: &str) -> String {
    format!("/posts/{}/", urlencoding::encode(post_id))
}
