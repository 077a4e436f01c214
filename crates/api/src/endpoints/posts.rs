//! Post pages and actions.

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post},
};
use serde::Serialize;
use yatube_common::AppResult;
use yatube_core::{CommentInput, Page, PostDetail, PostInput, PostView};
use yatube_db::entities::{group, post as post_entity};

use super::PageQuery;
use crate::{
    extractors::{AuthUser, ClientIp, MaybeAuthUser},
    middleware::AppState,
    response::{PageResponse, post_path, profile_path, see_other},
};

/// Listing payload.
#[derive(Serialize)]
pub struct FeedPage {
    pub page_obj: Page<PostView>,
}

/// Post form payload.
#[derive(Serialize)]
pub struct PostForm {
    pub groups: Vec<group::Model>,
    pub is_edit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<post_entity::Model>,
}

/// Global feed.
async fn index(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    MaybeAuthUser(user): MaybeAuthUser,
    Query(query): Query<PageQuery>,
) -> AppResult<PageResponse<FeedPage>> {
    let page_obj = state.feed_service.global(query.number()).await?;
    let context = state.page_context_service.build(&ip, user.as_ref()).await?;

    Ok(PageResponse::new(context, FeedPage { page_obj }))
}

/// Posts ordered by views.
async fn most_viewed(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    MaybeAuthUser(user): MaybeAuthUser,
    Query(query): Query<PageQuery>,
) -> AppResult<PageResponse<FeedPage>> {
    let page_obj = state.feed_service.most_viewed(query.number()).await?;
    let context = state.page_context_service.build(&ip, user.as_ref()).await?;

    Ok(PageResponse::new(context, FeedPage { page_obj }))
}

/// Post page. Opening it counts a view for the client address.
async fn detail(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(post_id): Path<String>,
) -> AppResult<PageResponse<PostDetail>> {
    let post = state.post_service.get(&post_id).await?;
    state.visit_service.record_view(&post.id, &ip).await?;

    let detail = state.post_service.detail(&post.id).await?;
    let context = state.page_context_service.build(&ip, user.as_ref()).await?;

    Ok(PageResponse::new(context, detail))
}

/// Empty post form.
async fn create_form(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    AuthUser(user): AuthUser,
) -> AppResult<PageResponse<PostForm>> {
    let groups = state.group_service.list().await?;
    let context = state.page_context_service.build(&ip, Some(&user)).await?;

    Ok(PageResponse::new(
        context,
        PostForm {
            groups,
            is_edit: false,
            post: None,
        },
    ))
}

/// Publish a post.
async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Form(input): Form<PostInput>,
) -> AppResult<Response> {
    state.post_service.create(&user, input).await?;
    Ok(see_other(&profile_path(&user.username)))
}

/// Edit form filled with the post.
async fn edit_form(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
) -> AppResult<PageResponse<PostForm>> {
    let post = state.post_service.get_for_author(&user, &post_id).await?;
    let groups = state.group_service.list().await?;
    let context = state.page_context_service.build(&ip, Some(&user)).await?;

    Ok(PageResponse::new(
        context,
        PostForm {
            groups,
            is_edit: true,
            post: Some(post),
        },
    ))
}

/// Save an edited post.
async fn edit(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    Form(input): Form<PostInput>,
) -> AppResult<Response> {
    let post = state.post_service.update(&user, &post_id, input).await?;
    Ok(see_other(&post_path(&post.id)))
}

/// Deleting takes a POST; a plain visit goes back to the post.
async fn delete_form(Path(post_id): Path<String>) -> Response {
    see_other(&post_path(&post_id))
}

/// Delete a post.
async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let author = state.post_service.delete(&user, &post_id).await?;
    Ok(see_other(&profile_path(&author)))
}

/// Comment on a post.
async fn comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    Form(input): Form<CommentInput>,
) -> AppResult<Response> {
    state.comment_service.create(&user, &post_id, input).await?;
    Ok(see_other(&post_path(&post_id)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/favoritviews/", get(most_viewed))
        .route("/create/", get(create_form).post(create))
        .route("/posts/{post_id}/", get(detail))
        .route("/posts/{post_id}/edit/", get(edit_form).post(edit))
        .route("/posts/{post_id}/delete/", get(delete_form).post(delete))
        .route("/posts/{post_id}/comment/", post(comment))
}
