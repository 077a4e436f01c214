//! Static pages.

use axum::{Router, extract::State, routing::get};
use serde::Serialize;
use yatube_common::AppResult;

use crate::{
    extractors::{ClientIp, MaybeAuthUser},
    middleware::AppState,
    response::PageResponse,
};

#[derive(Serialize)]
pub struct AboutPage {
    pub page: &'static str,
}

async fn about_page(
    state: &AppState,
    ip: &str,
    user: Option<&yatube_db::entities::user::Model>,
    page: &'static str,
) -> AppResult<PageResponse<AboutPage>> {
    let context = state.page_context_service.build(ip, user).await?;
    Ok(PageResponse::new(context, AboutPage { page }))
}

async fn author(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    MaybeAuthUser(user): MaybeAuthUser,
) -> AppResult<PageResponse<AboutPage>> {
    about_page(&state, &ip, user.as_ref(), "author").await
}

async fn tech(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    MaybeAuthUser(user): MaybeAuthUser,
) -> AppResult<PageResponse<AboutPage>> {
    about_page(&state, &ip, user.as_ref(), "tech").await
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/about/author/", get(author))
        .route("/about/tech/", get(tech))
}
