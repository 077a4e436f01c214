//! Group pages.

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post},
};
use yatube_common::AppResult;
use yatube_core::{CreateGroupInput, GroupFeed};

use super::PageQuery;
use crate::{
    extractors::{AuthUser, ClientIp, MaybeAuthUser},
    middleware::AppState,
    response::{PageResponse, see_other},
};

/// Posts of a group.
async fn feed(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<PageResponse<GroupFeed>> {
    let feed = state.feed_service.group(&slug, query.number()).await?;
    let context = state.page_context_service.build(&ip, user.as_ref()).await?;

    Ok(PageResponse::new(context, feed))
}

/// Create a group.
async fn create(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Form(input): Form<CreateGroupInput>,
) -> AppResult<Response> {
    let group = state.group_service.create(input).await?;
    Ok(see_other(&format!("/group/{}/", urlencoding::encode(&group.slug))))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/group/create/", post(create))
        .route("/group/{slug}/", get(feed))
}
