//! Like toggle.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use yatube_common::{AppError, AppResult};

use crate::{
    extractors::{ClientIp, MaybeAuthUser},
    middleware::AppState,
};

/// `?data=` carries the client's current like flag.
#[derive(Debug, Deserialize)]
pub struct LikeQuery {
    pub data: Option<String>,
}

/// Parse the client flag.
pub fn parse_flag(raw: &str) -> AppResult<bool> {
    match raw {
        "True" | "true" | "1" => Ok(true),
        "False" | "false" | "0" => Ok(false),
        other => Err(AppError::BadRequest(format!("invalid like flag: {other}"))),
    }
}

/// Toggle the caller's like. Signed-in callers are counted as visitors.
async fn toggle(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(post_id): Path<String>,
    Query(query): Query<LikeQuery>,
) -> AppResult<Response> {
    // Anonymous callers get a body, not a redirect.
    let Some(user) = user else {
        return Ok(Json(json!({ "result": 404 })).into_response());
    };

    let flag = parse_flag(query.data.as_deref().unwrap_or_default())?;
    state.visit_service.record(&ip).await?;
    let toggle = state.like_service.toggle(&user, &post_id, flag).await?;

    Ok(Json(toggle).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/posts/{post_id}/like/", get(toggle))
}
