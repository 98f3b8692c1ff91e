//! Native tree search endpoint
//!
//! GET /api/species/search?city=Austin&state=TX

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::models::SearchResponse;
use crate::services::location::is_state_code;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
}

/// GET /api/species/search
///
/// A missing city or an unknown state code is a 400. A city that is present
/// but not plausibly a place name is a normal empty result.
pub async fn search_species(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    if query.city.trim().is_empty() {
        return Err(ApiError::BadRequest("city is required".to_string()));
    }
    if !is_state_code(&query.state) {
        return Err(ApiError::BadRequest(format!(
            "state must be a two-letter US state code, got {:?}",
            query.state.trim()
        )));
    }

    match state.search.search_native_trees(&query.city, &query.state).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            *state.last_error.write().await = Some(e.to_string());
            Err(ApiError::from(e))
        }
    }
}

pub fn search_routes() -> Router<AppState> {
    Router::new().route("/api/species/search", get(search_species))
}
