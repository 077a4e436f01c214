//! Session endpoints.

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use yatube_common::AppResult;
use yatube_core::RegisterInput;
use yatube_db::entities::user;

use crate::{
    extractors::{AuthUser, ClientIp, MaybeAuthUser},
    middleware::AppState,
    response::{PageResponse, see_other},
};

/// Login form fields.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Issued session.
#[derive(Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub username: String,
    pub token: String,
}

/// `?next=` on the login page.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Login page payload.
#[derive(Serialize)]
pub struct LoginPage {
    pub next: String,
}

fn session_cookie(name: &str, token: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn issue(state: &AppState, jar: CookieJar, user: user::Model) -> Response {
    let token = user.token.unwrap_or_default();
    let jar = jar.add(session_cookie(&state.config.auth.cookie_name, &token));

    (
        jar,
        Json(SessionResponse {
            id: user.id,
            username: user.username,
            token,
        }),
    )
        .into_response()
}

/// Create an account and sign it in.
async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(input): Form<RegisterInput>,
) -> AppResult<Response> {
    let user = state.user_service.register(input).await?;
    Ok(issue(&state, jar, user))
}

/// Sign in with username and password.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(req): Form<LoginRequest>,
) -> AppResult<Response> {
    let user = state
        .user_service
        .authenticate(&req.username, &req.password)
        .await?;

    Ok(issue(&state, jar, user))
}

/// Login page.
async fn login_form(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    MaybeAuthUser(user): MaybeAuthUser,
    Query(query): Query<NextQuery>,
) -> AppResult<PageResponse<LoginPage>> {
    let context = state.page_context_service.build(&ip, user.as_ref()).await?;
    let next = query.next.unwrap_or_else(|| "/".to_string());

    Ok(PageResponse::new(context, LoginPage { next }))
}

/// Sign out and invalidate the token.
async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    AuthUser(user): AuthUser,
) -> AppResult<Response> {
    state.user_service.logout(&user).await?;

    let jar = jar.remove(Cookie::build(state.config.auth.cookie_name.clone()).path("/"));
    Ok((jar, see_other("/")).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup/", post(signup))
        .route("/login/", get(login_form).post(login))
        .route("/logout/", post(logout))
}
