//! Upstream photo API access.
//!
//! Everything Encore knows about albums and images comes from the SmugMug
//! API v2. The [`PhotoSource`] trait is the seam between the aggregation
//! logic and the network:
//!
//! - **SmugMug** - authenticated HTTP client used in production
//! - **Mock** - in-memory fixture for tests and offline runs
//!
//! No retries are performed at this layer. A failed call surfaces as an
//! [`EncoreError`](crate::error::EncoreError) and the caller decides whether
//! to skip or abort.

mod mock;
mod smugmug;

pub use mock::MockPhotoSource;
pub use smugmug::{SmugMugClient, SmugMugConfig};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Read-only access to the photo-hosting API.
///
/// Implementations must be thread-safe (`Send + Sync`); the aggregator issues
/// several image detail requests concurrently.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Album metadata, including album-level (curated) keywords.
    async fn fetch_album_meta(&self, album_id: &str) -> Result<Value>;

    /// One page of the album's image listing. `start` is 1-based.
    async fn fetch_album_images_page(
        &self,
        album_id: &str,
        page_size: usize,
        start: usize,
    ) -> Result<Value>;

    /// Detail for a single image, including its keywords.
    async fn fetch_image_detail(&self, image_id: &str) -> Result<Value>;

    /// Albums contained in folder `name` under the slash-separated `parent`.
    ///
    /// `name` is a single path segment; a `/` inside it is part of the name.
    async fn fetch_folder_albums(&self, parent: &str, name: &str) -> Result<Value>;

    /// Short identifier used in logs.
    fn source_name(&self) -> &'static str;
}
