//! Profile page.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use yatube_common::AppResult;
use yatube_core::ProfileFeed;

use super::PageQuery;
use crate::{
    extractors::{ClientIp, MaybeAuthUser},
    middleware::AppState,
    response::PageResponse,
};

/// Author page with their posts.
async fn profile(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<PageResponse<ProfileFeed>> {
    let feed = state
        .feed_service
        .profile(&username, user.as_ref(), query.number())
        .await?;
    let context = state.page_context_service.build(&ip, user.as_ref()).await?;

    Ok(PageResponse::new(context, feed))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/profile/{username}/", get(profile))
}
