//! SmugMug proxy handlers
//!
//! Thin pass-through routes used by the archive viewer: band folder
//! resolution, paged album images, album metadata and image detail.
//! Upstream failures surface as 502 `UPSTREAM_ERROR`.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use encore_core::aggregator::DEFAULT_PAGE_SIZE;
use encore_core::{resolve_folder, FolderResolution, Region};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{validate_key, validate_paging, validate_slug};

/// Query parameters for folder resolution
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct FolderQuery {
    /// Folder name as typed in the band sheet, tried first
    pub folder: Option<String>,
    /// Region folder: Local, Regional, National or International (default Local)
    #[param(example = "Local")]
    pub region: Option<String>,
}

/// Query parameters for a page of album images
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Images per page (default 200)
    pub count: Option<usize>,
    /// 1-based offset of the first image (default 1)
    pub start: Option<usize>,
}

/// Resolve a band slug to its SmugMug folder and list its albums.
///
/// Never fails on a miss: an empty album list is returned with an `info`
/// message naming every folder tried.
#[utoipa::path(
    get,
    path = "/smug/{slug}",
    tag = "SmugMug",
    params(("slug" = String, Path, description = "Band slug, e.g. the-band-of-gold"), FolderQuery),
    responses(
        (status = 200, description = "Folder resolution", body = FolderResolution),
        (status = 400, description = "Invalid slug")
    )
)]
pub async fn folder_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<FolderQuery>,
) -> Result<Json<FolderResolution>, ApiError> {
    let slug = validate_slug(&slug)?;
    let folder = query
        .folder
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty());
    let region = Region::parse_lenient(query.region.as_deref());

    let resolution =
        resolve_folder(state.source.as_ref(), &state.folder_root, slug, folder, region).await;
    Ok(Json(resolution))
}

/// Fetch one page of an album's images.
#[utoipa::path(
    get,
    path = "/smug/album/{album_key}",
    tag = "SmugMug",
    params(("album_key" = String, Path, description = "SmugMug album key"), PageQuery),
    responses(
        (status = 200, description = "Upstream images page"),
        (status = 400, description = "Invalid album key or paging"),
        (status = 502, description = "Photo API error")
    )
)]
pub async fn album_images_handler(
    State(state): State<AppState>,
    Path(album_key): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, ApiError> {
    let album_key = validate_key(&album_key, "album key")?;
    let count = query.count.unwrap_or(DEFAULT_PAGE_SIZE);
    let start = query.start.unwrap_or(1);
    validate_paging(count, start)?;

    let page = state
        .source
        .fetch_album_images_page(album_key, count, start)
        .await?;
    Ok(Json(page))
}

/// Fetch an album's metadata, including its curated keywords.
#[utoipa::path(
    get,
    path = "/smug/album-meta/{album_key}",
    tag = "SmugMug",
    params(("album_key" = String, Path, description = "SmugMug album key")),
    responses(
        (status = 200, description = "Upstream album metadata"),
        (status = 400, description = "Invalid album key"),
        (status = 502, description = "Photo API error")
    )
)]
pub async fn album_meta_handler(
    State(state): State<AppState>,
    Path(album_key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let album_key = validate_key(&album_key, "album key")?;
    let meta = state.source.fetch_album_meta(album_key).await?;
    Ok(Json(meta))
}

/// Fetch one image's detail, including its keywords.
#[utoipa::path(
    get,
    path = "/smug/image/{image_key}",
    tag = "SmugMug",
    params(("image_key" = String, Path, description = "SmugMug image key")),
    responses(
        (status = 200, description = "Upstream image detail"),
        (status = 400, description = "Invalid image key"),
        (status = 502, description = "Photo API error")
    )
)]
pub async fn image_handler(
    State(state): State<AppState>,
    Path(image_key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let image_key = validate_key(&image_key, "image key")?;
    let detail = state.source.fetch_image_detail(image_key).await?;
    Ok(Json(detail))
}
