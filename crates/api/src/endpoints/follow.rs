//! Subscriptions.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Response,
    routing::get,
};
use yatube_common::AppResult;

use super::{PageQuery, posts::FeedPage};
use crate::{
    extractors::{AuthUser, ClientIp},
    middleware::AppState,
    response::{PageResponse, see_other},
};

const FOLLOW_PATH: &str = "/follow/";

/// Posts of followed authors.
async fn feed(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    AuthUser(user): AuthUser,
    Query(query): Query<PageQuery>,
) -> AppResult<PageResponse<FeedPage>> {
    let page_obj = state.feed_service.follow_feed(&user, query.number()).await?;
    let context = state.page_context_service.build(&ip, Some(&user)).await?;

    Ok(PageResponse::new(context, FeedPage { page_obj }))
}

async fn follow(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> AppResult<Response> {
    state.follow_service.follow(&user, &username).await?;
    Ok(see_other(FOLLOW_PATH))
}

async fn unfollow(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> AppResult<Response> {
    state.follow_service.unfollow(&user, &username).await?;
    Ok(see_other(FOLLOW_PATH))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(FOLLOW_PATH, get(feed))
        .route("/profile/{username}/follow/", get(follow))
        .route("/profile/{username}/unfollow/", get(unfollow))
}
