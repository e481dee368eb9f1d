//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod curated;
pub mod health;
pub mod smug;

pub use crate::state::AppState;
pub use curated::{
    curated_index_handler, missing_album_id, CuratedIndexQuery, CuratedIndexResponse,
};
pub use health::{health, ready, HealthResponse, ReadyResponse};
pub use smug::{
    album_images_handler, album_meta_handler, folder_handler, image_handler, FolderQuery,
    PageQuery,
};
