//! In-memory photo source for tests and offline runs.
//!
//! Albums, images, and folders are declared up front with a builder; the
//! mock then answers the [`PhotoSource`] calls with SmugMug-shaped JSON.
//! Individual images, pages, and album metadata can be made to fail.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::PhotoSource;
use crate::error::{EncoreError, Result};

#[derive(Debug, Clone)]
struct MockImage {
    key: String,
    keywords: Vec<String>,
}

#[derive(Debug, Default)]
struct MockAlbum {
    /// `None` makes the metadata call fail.
    curated: Option<Vec<String>>,
    /// Album keywords embedded in every images page.
    page_keywords: Option<Vec<String>>,
    images: Vec<MockImage>,
    failing_pages: HashSet<usize>,
}

/// Mock photo source. Not backed by any network I/O.
#[derive(Debug, Default)]
pub struct MockPhotoSource {
    albums: HashMap<String, MockAlbum>,
    failing_images: HashSet<String>,
    folders: HashMap<String, Value>,
    detail_delay: Option<Duration>,
    meta_calls: AtomicUsize,
    page_calls: AtomicUsize,
    detail_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockPhotoSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an album with its curated keywords.
    pub fn with_album(mut self, album_id: &str, curated: &[&str]) -> Self {
        self.album_mut(album_id).curated = Some(curated.iter().map(|k| k.to_string()).collect());
        self
    }

    /// Declare an album whose metadata call fails with HTTP 500.
    pub fn with_failing_album_meta(mut self, album_id: &str) -> Self {
        self.album_mut(album_id).curated = None;
        self
    }

    /// Embed album-level keywords in the album's images pages.
    pub fn with_page_keywords(mut self, album_id: &str, keywords: &[&str]) -> Self {
        self.album_mut(album_id).page_keywords =
            Some(keywords.iter().map(|k| k.to_string()).collect());
        self
    }

    /// Append an image with its keywords to an album.
    pub fn with_image(mut self, album_id: &str, image_key: &str, keywords: &[&str]) -> Self {
        self.album_mut(album_id).images.push(MockImage {
            key: image_key.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        });
        self
    }

    /// Make the detail call for one image fail with HTTP 500.
    pub fn with_failing_image(mut self, image_key: &str) -> Self {
        self.failing_images.insert(image_key.to_string());
        self
    }

    /// Make the images page starting at `start` fail with HTTP 502.
    pub fn with_failing_page(mut self, album_id: &str, start: usize) -> Self {
        self.album_mut(album_id).failing_pages.insert(start);
        self
    }

    /// Register an albums listing for a folder path.
    pub fn with_folder(mut self, folder_path: &str, album_names: &[&str]) -> Self {
        let albums: Vec<Value> = album_names
            .iter()
            .map(|name| json!({"Name": name, "AlbumKey": format!("key-{name}")}))
            .collect();
        self.folders.insert(
            folder_path.to_string(),
            json!({"Response": {"Album": albums}}),
        );
        self
    }

    /// Delay every detail call, so concurrent calls overlap.
    pub fn with_detail_delay(mut self, delay: Duration) -> Self {
        self.detail_delay = Some(delay);
        self
    }

    /// Number of album metadata calls served.
    pub fn meta_calls(&self) -> usize {
        self.meta_calls.load(Ordering::SeqCst)
    }

    /// Number of images page calls served.
    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    /// Number of image detail calls served.
    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    /// Highest number of detail calls observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn album_mut(&mut self, album_id: &str) -> &mut MockAlbum {
        self.albums.entry(album_id.to_string()).or_default()
    }

    fn find_image(&self, image_id: &str) -> Option<&MockImage> {
        self.albums
            .values()
            .flat_map(|album| album.images.iter())
            .find(|img| img.key == image_id)
    }

    fn not_found(what: &str) -> EncoreError {
        EncoreError::upstream(404, &format!("{{\"Message\":\"{what} not found\"}}"))
    }
}

#[async_trait]
impl PhotoSource for MockPhotoSource {
    async fn fetch_album_meta(&self, album_id: &str) -> Result<Value> {
        self.meta_calls.fetch_add(1, Ordering::SeqCst);
        let album = self
            .albums
            .get(album_id)
            .ok_or_else(|| Self::not_found("Album"))?;

        match &album.curated {
            Some(curated) => Ok(json!({
                "Response": {"Album": {"AlbumKey": album_id, "Keywords": curated.join("; ")}}
            })),
            None => Err(EncoreError::upstream(500, "metadata unavailable")),
        }
    }

    async fn fetch_album_images_page(
        &self,
        album_id: &str,
        page_size: usize,
        start: usize,
    ) -> Result<Value> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        let album = self
            .albums
            .get(album_id)
            .ok_or_else(|| Self::not_found("Album"))?;

        if album.failing_pages.contains(&start) {
            return Err(EncoreError::upstream(502, "bad gateway"));
        }

        let images: Vec<Value> = album
            .images
            .iter()
            .skip(start.saturating_sub(1))
            .take(page_size)
            .map(|img| json!({"ImageKey": img.key}))
            .collect();

        let mut response = json!({"AlbumImage": images});
        if let Some(keywords) = &album.page_keywords {
            response["Album"] = json!({"AlbumKey": album_id, "KeywordArray": keywords});
        }
        Ok(json!({"Response": response}))
    }

    async fn fetch_image_detail(&self, image_id: &str) -> Result<Value> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.detail_delay {
            tokio::time::sleep(delay).await;
        }

        let result = if self.failing_images.contains(image_id) {
            Err(EncoreError::upstream(500, "image detail unavailable"))
        } else {
            self.find_image(image_id)
                .map(|img| {
                    json!({
                        "Response": {"Image": {"ImageKey": img.key, "KeywordArray": img.keywords}}
                    })
                })
                .ok_or_else(|| Self::not_found("Image"))
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn fetch_folder_albums(&self, parent: &str, name: &str) -> Result<Value> {
        let folder_path = format!("{}/{name}", parent.trim_matches('/'));
        self.folders
            .get(&folder_path)
            .cloned()
            .ok_or_else(|| Self::not_found("Folder"))
    }

    fn source_name(&self) -> &'static str {
        "mock"
    }
}
