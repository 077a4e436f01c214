//! API integration tests.
//!
//! Every test drives the full router over a migrated in-memory database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use serde_json::Value;
use tower::ServiceExt;
use yatube_api::{AppState, app};
use yatube_common::Config;
use yatube_db::test_utils::memory_database;

async fn create_test_app() -> Router {
    let db = memory_database().await.expect("in-memory database");
    let config = Config::with_database_url("sqlite::memory:");
    let state = AppState::new(config, Arc::new(db)).expect("state");
    app(state)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Register a user and return their access token.
async fn signup(app: &Router, username: &str) -> String {
    let body = format!("username={username}&email={username}%40example.com&password=password123");
    let response = send(app, post_form("/auth/signup/", None, &body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(header::SET_COOKIE));

    let json = json_body(response).await;
    assert_eq!(json["username"], username);
    json["token"].as_str().unwrap().to_string()
}

/// Id of the newest post in the global feed.
async fn newest_post_id(app: &Router) -> String {
    let json = json_body(send(app, get("/", None)).await).await;
    json["page_obj"]["items"][0]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_unauthenticated_create_redirects_to_login() {
    let app = create_test_app().await;

    let response = send(&app, post_form("/create/", None, "text=hello")).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login/?next=%2Fcreate%2F");
}

#[tokio::test]
async fn test_anonymous_mutations_redirect_with_next() {
    let app = create_test_app().await;

    let response = send(&app, post_form("/posts/abc/comment/", None, "text=hi")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/auth/login/?next=%2Fposts%2Fabc%2Fcomment%2F"
    );

    let response = send(&app, get("/profile/bob/follow/", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/auth/login/?next=%2Fprofile%2Fbob%2Ffollow%2F"
    );

    let response = send(&app, post_form("/posts/abc/delete/", None, "")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login/?next=%2Fposts%2Fabc%2Fdelete%2F");
}

#[tokio::test]
async fn test_unknown_path_returns_404_with_path() {
    let app = create_test_app().await;

    let response = send(&app, get("/nonexistent/endpoint", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = json_body(response).await;
    assert_eq!(json["path"], "/nonexistent/endpoint");
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_anonymous_like_answers_404_result() {
    let app = create_test_app().await;

    let response = send(&app, get("/posts/missing/like/?data=true", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["result"], 404);
}

#[tokio::test]
async fn test_empty_search_returns_blank_fragment() {
    let app = create_test_app().await;

    let response = send(&app, get("/search/?data=", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert!(json["result"].as_str().unwrap().trim().is_empty());
}

#[tokio::test]
async fn test_create_post_then_search_finds_it() {
    let app = create_test_app().await;
    let token = signup(&app, "alice").await;

    let response = send(&app, post_form("/create/", Some(&token), "text=Hello+World")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/profile/alice/");

    let json = json_body(send(&app, get("/search/?data=hello", None)).await).await;
    let html = json["result"].as_str().unwrap();
    assert!(html.contains("Hello World"));
    assert!(html.contains("/profile/alice/"));
}

#[tokio::test]
async fn test_blank_post_is_rejected() {
    let app = create_test_app().await;
    let token = signup(&app, "alice").await;

    let response = send(&app, post_form("/create/", Some(&token), "text=+++")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(send(&app, get("/profile/alice/", None)).await).await;
    assert_eq!(json["posts_count"], 0);
}

#[tokio::test]
async fn test_non_author_cannot_delete() {
    let app = create_test_app().await;
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;

    send(&app, post_form("/create/", Some(&alice), "text=mine")).await;
    let post_id = newest_post_id(&app).await;
    let delete_uri = format!("/posts/{post_id}/delete/");

    let response = send(&app, post_form(&delete_uri, Some(&bob), "")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, post_form(&delete_uri, Some(&alice), "")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/profile/alice/");

    let response = send(&app, get(&format!("/posts/{post_id}/"), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_like_toggle_round_trip() {
    let app = create_test_app().await;
    let token = signup(&app, "alice").await;

    send(&app, post_form("/create/", Some(&token), "text=likeable")).await;
    let post_id = newest_post_id(&app).await;

    let uri = format!("/posts/{post_id}/like/?data=false");
    let json = json_body(send(&app, get(&uri, Some(&token))).await).await;
    assert_eq!(json["result"], false);
    assert_eq!(json["like_cout"], 1);

    let uri = format!("/posts/{post_id}/like/?data=true");
    let json = json_body(send(&app, get(&uri, Some(&token))).await).await;
    assert_eq!(json["like_cout"], 0);

    let response = send(&app, get(&format!("/posts/{post_id}/like/?data=maybe"), Some(&token))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_like_counts_caller_as_visitor() {
    let app = create_test_app().await;
    let token = signup(&app, "alice").await;

    send(&app, post_form("/create/", Some(&token), "text=likeable")).await;
    let post_id = newest_post_id(&app).await;

    let request = Request::builder()
        .uri(format!("/posts/{post_id}/like/?data=false"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header("x-forwarded-for", "198.51.100.7")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, request).await.status(), StatusCode::OK);

    // The feed request above and the like come from two addresses.
    let json = json_body(send(&app, get("/about/author/", None)).await).await;
    assert_eq!(json["visits"]["all"], 2);
}

#[tokio::test]
async fn test_follow_feed_shows_followed_author() {
    let app = create_test_app().await;
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;

    send(&app, post_form("/create/", Some(&bob), "text=from+bob")).await;

    let response = send(&app, get("/profile/bob/follow/", Some(&alice))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/follow/");

    let json = json_body(send(&app, get("/follow/", Some(&alice))).await).await;
    let items = json["page_obj"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["text"], "from bob");
    assert_eq!(items[0]["author_username"], "bob");

    let json = json_body(send(&app, get("/profile/bob/", Some(&alice))).await).await;
    assert_eq!(json["following"], true);

    let response = send(&app, get("/profile/bob/unfollow/", Some(&alice))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let response = send(&app, get("/profile/bob/unfollow/", Some(&alice))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_page_context_is_merged_into_pages() {
    let app = create_test_app().await;

    let request = Request::builder()
        .uri("/about/tech/")
        .header("x-forwarded-for", "203.0.113.9")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["visits"]["all"], 1);
    assert_eq!(json["visits"]["today"], 1);
    assert_eq!(json["posts_like"], Value::Array(Vec::new()));
    assert_eq!(json["media_url"], "/media/");
    assert_eq!(json["page"], "tech");
}

#[tokio::test]
async fn test_group_create_and_empty_feed() {
    let app = create_test_app().await;
    let token = signup(&app, "alice").await;

    let response = send(
        &app,
        post_form("/group/create/", Some(&token), "title=Cats&slug=&description=meow"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/group/cats/");

    let response = send(&app, get("/group/cats/", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logout_invalidates_token() {
    let app = create_test_app().await;
    let token = signup(&app, "alice").await;

    let response = send(&app, post_form("/auth/logout/", Some(&token), "")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = send(&app, get("/create/", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login/?next=%2Fcreate%2F");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = create_test_app().await;
    signup(&app, "alice").await;

    let response = send(
        &app,
        post_form("/auth/login/", None, "username=alice&password=wrong-password"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
