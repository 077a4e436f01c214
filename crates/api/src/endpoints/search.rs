//! Live search.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use yatube_common::AppResult;

use crate::{middleware::AppState, render};

/// `?data=` carries the search text.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub data: String,
}

/// Search posts and return the results as an HTML fragment.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Value>> {
    let posts = state.search_service.search(&query.data).await?;
    let html = render::search_results(&state.templates, &posts)?;

    Ok(Json(json!({ "result": html })))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/search/", get(search))
}
