//! Curated index handler
//!
//! Handles GET /curated-index/{albumId} requests.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use encore_core::{CacheStatus, CuratedIndexResult};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{query_flag, validate_key};

/// Query parameters for the curated index
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CuratedIndexQuery {
    /// `1` forces a recomputation, bypassing both cache tiers
    #[param(example = "0")]
    pub refresh: Option<String>,
    /// `1` attaches the failure detail to 500 responses
    #[param(example = "0")]
    pub debug: Option<String>,
}

/// Curated index plus how it was served.
#[derive(Debug, Serialize, ToSchema)]
pub struct CuratedIndexResponse {
    #[serde(flatten)]
    pub result: CuratedIndexResult,
    pub cache: CacheStatus,
}

/// Verify an album's curated keywords against its images.
///
/// Served from memory or disk while fresh; computed (and cached) otherwise.
/// Images whose detail cannot be fetched are skipped and counted in
/// `summary.imagesFailed`.
#[utoipa::path(
    get,
    path = "/curated-index/{album_id}",
    tag = "Curated Index",
    params(
        ("album_id" = String, Path, description = "SmugMug album key"),
        CuratedIndexQuery
    ),
    responses(
        (status = 200, description = "Curated index", body = CuratedIndexResponse),
        (status = 400, description = "Missing or invalid album id"),
        (status = 500, description = "Index could not be computed")
    )
)]
pub async fn curated_index_handler(
    State(state): State<AppState>,
    Path(album_id): Path<String>,
    Query(query): Query<CuratedIndexQuery>,
) -> Result<Json<CuratedIndexResponse>, ApiError> {
    let album_id = validate_key(&album_id, "album id")?;
    let refresh = query_flag(query.refresh.as_deref());
    let debug = query_flag(query.debug.as_deref());

    let (result, cache) = state
        .service
        .curated_index(album_id, refresh)
        .await
        .map_err(|e| ApiError::aggregation(e, debug))?;

    Ok(Json(CuratedIndexResponse { result, cache }))
}

/// GET /curated-index without an album id
pub async fn missing_album_id() -> ApiError {
    ApiError::bad_request("Missing album id")
}
