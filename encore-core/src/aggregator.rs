//! Curated-index aggregation.
//!
//! Reconciles the keywords an editor assigned to an album against the
//! keywords actually carried by the album's images:
//!
//! 1. Fetch album metadata and extract curated keywords (failure degrades to
//!    an empty list, recoverable from the first images page).
//! 2. Paginate the album's images.
//! 3. Fetch every image's detail through a bounded worker pool and count
//!    normalized keywords.
//! 4. Mark each curated keyword verified or missing.
//!
//! Per-image failures are logged and skipped. The computation only fails
//! when neither the album metadata nor the first images page is reachable.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::error::{EncoreError, Result};
use crate::index::{CuratedIndexResult, IndexInputs};
use crate::keywords::{
    extract_album_keywords, extract_image_keywords, normalize_keyword, KeywordShape,
};
use crate::listing::{extract_image_keys, page_album, page_len};
use crate::upstream::PhotoSource;

/// Images requested per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Image detail requests allowed in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Listing pages fetched before pagination gives up.
pub const DEFAULT_MAX_PAGES: usize = 250;

/// Default time-to-live of a computed index (6 hours).
pub const DEFAULT_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Aggregator tuning.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub page_size: usize,
    /// Ceiling on concurrent image detail fetches.
    pub concurrency: usize,
    pub max_pages: usize,
    /// Stamped into results as `ttlMs`.
    pub ttl: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            max_pages: DEFAULT_MAX_PAGES,
            ttl: DEFAULT_TTL,
        }
    }
}

/// Image keys of an album plus what the first page revealed.
#[derive(Debug, Default)]
struct ImageListing {
    image_ids: Vec<String>,
    /// Album-level keywords embedded in the first page.
    page_keywords: Vec<String>,
    first_page_error: Option<EncoreError>,
}

/// Keyword counts gathered from image details.
#[derive(Debug, Default)]
struct ImageScan {
    frequency: BTreeMap<String, u64>,
    failed: usize,
}

impl ImageScan {
    /// Count each normalized keyword once per image.
    fn record(&mut self, keywords: &[String]) {
        let distinct: BTreeSet<String> = keywords
            .iter()
            .map(|k| normalize_keyword(k))
            .filter(|k| !k.is_empty())
            .collect();
        for keyword in distinct {
            *self.frequency.entry(keyword).or_insert(0) += 1;
        }
    }
}

/// Computes [`CuratedIndexResult`]s from a [`PhotoSource`].
pub struct CuratedIndexer {
    source: Arc<dyn PhotoSource>,
    config: AggregatorConfig,
}

impl CuratedIndexer {
    pub fn new(source: Arc<dyn PhotoSource>, config: AggregatorConfig) -> Self {
        Self { source, config }
    }

    /// Compute the curated index for an album.
    #[instrument(level = "info", skip(self), fields(source = self.source.source_name()))]
    pub async fn compute_curated_index(&self, album_id: &str) -> Result<CuratedIndexResult> {
        let start = Instant::now();

        let (mut curated, meta_error) = match self.source.fetch_album_meta(album_id).await {
            Ok(meta) => (extract_album_keywords(&meta), None),
            Err(e) => {
                warn!(error = %e, "Album metadata fetch failed, continuing without curated keywords");
                (Vec::new(), Some(e))
            }
        };

        let listing = self.list_images(album_id).await;

        if let Some(meta_error) = meta_error {
            if let Some(page_error) = &listing.first_page_error {
                return Err(EncoreError::AggregationFailure {
                    album_id: album_id.to_string(),
                    reason: format!("album metadata: {meta_error}; first images page: {page_error}"),
                });
            }
            if !listing.page_keywords.is_empty() {
                info!(
                    count = listing.page_keywords.len(),
                    "Recovered curated keywords from images page"
                );
            }
            curated = listing.page_keywords.clone();
        }

        let scan = self.scan_images(&listing.image_ids).await;

        let result = CuratedIndexResult::verify(
            album_id,
            IndexInputs {
                curated,
                frequency: scan.frequency,
                images_scanned: listing.image_ids.len(),
                images_failed: scan.failed,
            },
            self.config.ttl.as_millis() as u64,
            Utc::now().timestamp_millis(),
        );

        info!(
            curated = result.summary.curated_keyword_count,
            verified = result.verified_keywords.len(),
            missing = result.missing_keywords.len(),
            images_scanned = result.summary.images_scanned,
            images_failed = result.summary.images_failed,
            latency_ms = start.elapsed().as_millis() as u64,
            "Curated index computed"
        );

        Ok(result)
    }

    /// Walk the album's listing pages until a short or empty page.
    async fn list_images(&self, album_id: &str) -> ImageListing {
        let page_size = self.config.page_size.max(1);
        let mut listing = ImageListing::default();
        let mut start = 1;

        for page_index in 0..self.config.max_pages {
            let page = match self
                .source
                .fetch_album_images_page(album_id, page_size, start)
                .await
            {
                Ok(page) => page,
                Err(e) if page_index == 0 => {
                    warn!(error = %e, "First images page failed");
                    listing.first_page_error = Some(e);
                    return listing;
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        start,
                        listed = listing.image_ids.len(),
                        "Images page failed, stopping pagination"
                    );
                    return listing;
                }
            };

            if page_index == 0 {
                listing.page_keywords = page_album(&page)
                    .map(|album| KeywordShape::detect(album).into_keywords())
                    .unwrap_or_default();
            }

            let entries = page_len(&page);
            listing.image_ids.extend(extract_image_keys(&page));
            debug!(start, entries, "Fetched images page");

            if entries < page_size {
                return listing;
            }
            start += page_size;
        }

        warn!(
            max_pages = self.config.max_pages,
            listed = listing.image_ids.len(),
            "Page ceiling reached, listing truncated"
        );
        listing
    }

    /// Fetch image details with at most `concurrency` requests in flight.
    async fn scan_images(&self, image_ids: &[String]) -> ImageScan {
        let source = self.source.as_ref();
        let mut scan = ImageScan::default();

        let mut details = stream::iter(image_ids.iter().cloned())
            .map(|image_id| async move {
                let outcome = source
                    .fetch_image_detail(&image_id)
                    .await
                    .map(|detail| extract_image_keywords(&detail));
                (image_id, outcome)
            })
            .buffer_unordered(self.config.concurrency.max(1));

        while let Some((image_id, outcome)) = details.next().await {
            match outcome {
                Ok(keywords) => scan.record(&keywords),
                Err(e) => {
                    warn!(image_id = %image_id, error = %e, "Skipping image after detail fetch failure");
                    scan.failed += 1;
                }
            }
        }

        scan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::MockPhotoSource;
    use std::collections::HashSet;

    fn indexer(
        source: MockPhotoSource,
        page_size: usize,
    ) -> (Arc<MockPhotoSource>, CuratedIndexer) {
        let source = Arc::new(source);
        let indexer = CuratedIndexer::new(
            source.clone(),
            AggregatorConfig {
                page_size,
                ..Default::default()
            },
        );
        (source, indexer)
    }

    /// Ten images, three failing, "Soundcheck" on two of the successful ones.
    fn soundcheck_album() -> MockPhotoSource {
        let mut source = MockPhotoSource::new().with_album("live", &["Soundcheck", "Encore"]);
        for i in 0..10 {
            let key = format!("img{i}");
            let keywords: &[&str] = match i {
                0 | 4 => &["Soundcheck", "Crowd"],
                1 => &["Encore"],
                _ => &["Crowd"],
            };
            source = source.with_image("live", &key, keywords);
        }
        source
            .with_failing_image("img1")
            .with_failing_image("img2")
            .with_failing_image("img3")
    }

    #[tokio::test]
    async fn test_partial_failure_is_tolerated() {
        let (source, indexer) = indexer(soundcheck_album(), 4);
        let result = indexer.compute_curated_index("live").await.unwrap();

        assert_eq!(result.summary.images_scanned, 10);
        assert_eq!(result.summary.images_failed, 3);
        assert_eq!(result.verified_keywords, vec!["Soundcheck"]);
        assert_eq!(result.missing_keywords, vec!["Encore"]);
        assert_eq!(result.frequency.get("soundcheck"), Some(&2));
        assert_eq!(result.frequency.get("crowd"), Some(&7));
        assert_eq!(result.frequency.get("encore"), None);
        assert_eq!(source.detail_calls(), 10);
        // 4 + 4 + 2
        assert_eq!(source.page_calls(), 3);
    }

    #[tokio::test]
    async fn test_partitions_cover_curated_keywords() {
        let source = MockPhotoSource::new()
            .with_album("a", &["Drums", "drums", "Bass ", "Keys", "Vocals"])
            .with_image("a", "1", &["drums", "BASS"])
            .with_image("a", "2", &["Vocals"]);
        let (_, indexer) = indexer(source, 200);
        let result = indexer.compute_curated_index("a").await.unwrap();

        let curated: HashSet<String> = ["drums", "bass", "keys", "vocals"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let verified: HashSet<String> =
            result.verified_keywords.iter().map(|k| normalize_keyword(k)).collect();
        let missing: HashSet<String> =
            result.missing_keywords.iter().map(|k| normalize_keyword(k)).collect();

        assert!(verified.is_disjoint(&missing));
        assert_eq!(&verified | &missing, curated);

        for record in &result.keywords {
            let count = result
                .frequency
                .get(&normalize_keyword(&record.keyword))
                .copied()
                .unwrap_or(0);
            assert_eq!(record.verified, count > 0);
            assert_eq!(record.image_count, count);
        }
    }

    #[tokio::test]
    async fn test_keyword_counted_once_per_image() {
        let source = MockPhotoSource::new()
            .with_album("a", &["Encore"])
            .with_image("a", "1", &["Encore", "encore", " ENCORE "]);
        let (_, indexer) = indexer(source, 200);
        let result = indexer.compute_curated_index("a").await.unwrap();
        assert_eq!(result.frequency.get("encore"), Some(&1));
    }

    #[tokio::test]
    async fn test_pagination_stops_on_exact_multiple() {
        let mut source = MockPhotoSource::new().with_album("a", &[]);
        for i in 0..6 {
            source = source.with_image("a", &format!("k{i}"), &[]);
        }
        let (source, indexer) = indexer(source, 3);
        let result = indexer.compute_curated_index("a").await.unwrap();
        assert_eq!(result.summary.images_scanned, 6);
        // Two full pages, then an empty one.
        assert_eq!(source.page_calls(), 3);
    }

    #[tokio::test]
    async fn test_metadata_failure_recovers_from_first_page() {
        let source = MockPhotoSource::new()
            .with_failing_album_meta("a")
            .with_page_keywords("a", &["Encore"])
            .with_image("a", "1", &["Encore"]);
        let (_, indexer) = indexer(source, 200);
        let result = indexer.compute_curated_index("a").await.unwrap();
        assert_eq!(result.verified_keywords, vec!["Encore"]);
    }

    #[tokio::test]
    async fn test_metadata_failure_without_fallback_is_empty() {
        let source = MockPhotoSource::new()
            .with_failing_album_meta("a")
            .with_image("a", "1", &["Encore"]);
        let (_, indexer) = indexer(source, 200);
        let result = indexer.compute_curated_index("a").await.unwrap();
        assert!(result.keywords.is_empty());
        assert_eq!(result.summary.images_scanned, 1);
        assert_eq!(result.frequency.get("encore"), Some(&1));
    }

    #[tokio::test]
    async fn test_metadata_and_first_page_failure_aborts() {
        let source = MockPhotoSource::new()
            .with_failing_album_meta("a")
            .with_failing_page("a", 1);
        let (_, indexer) = indexer(source, 200);
        let err = indexer.compute_curated_index("a").await.unwrap_err();
        assert!(matches!(err, EncoreError::AggregationFailure { .. }));
    }

    #[tokio::test]
    async fn test_first_page_failure_with_metadata_degrades() {
        let source = MockPhotoSource::new()
            .with_album("a", &["Encore"])
            .with_failing_page("a", 1);
        let (_, indexer) = indexer(source, 200);
        let result = indexer.compute_curated_index("a").await.unwrap();
        assert_eq!(result.summary.images_scanned, 0);
        assert_eq!(result.missing_keywords, vec!["Encore"]);
    }

    #[tokio::test]
    async fn test_later_page_failure_keeps_earlier_images() {
        let mut source = MockPhotoSource::new().with_album("a", &["X"]);
        for i in 0..5 {
            source = source.with_image("a", &format!("k{i}"), &["X"]);
        }
        let (_, indexer) = indexer(source.with_failing_page("a", 3), 2);
        let result = indexer.compute_curated_index("a").await.unwrap();
        assert_eq!(result.summary.images_scanned, 2);
        assert_eq!(result.frequency.get("x"), Some(&2));
    }

    #[tokio::test]
    async fn test_page_ceiling_truncates_listing() {
        let mut source = MockPhotoSource::new().with_album("a", &[]);
        for i in 0..10 {
            source = source.with_image("a", &format!("k{i}"), &[]);
        }
        let source = Arc::new(source);
        let indexer = CuratedIndexer::new(
            source.clone(),
            AggregatorConfig {
                page_size: 2,
                max_pages: 2,
                ..Default::default()
            },
        );
        let result = indexer.compute_curated_index("a").await.unwrap();
        assert_eq!(result.summary.images_scanned, 4);
        assert_eq!(source.page_calls(), 2);
    }

    #[tokio::test]
    async fn test_worker_pool_is_bounded() {
        let mut source = MockPhotoSource::new()
            .with_album("a", &[])
            .with_detail_delay(Duration::from_millis(5));
        for i in 0..12 {
            source = source.with_image("a", &format!("k{i}"), &[]);
        }
        let (source, indexer) = indexer(source, 200);
        indexer.compute_curated_index("a").await.unwrap();

        assert_eq!(source.detail_calls(), 12);
        assert!(source.max_in_flight() <= DEFAULT_CONCURRENCY);
        assert!(source.max_in_flight() > 1);
    }

    #[tokio::test]
    async fn test_result_carries_ttl() {
        let source = MockPhotoSource::new().with_album("a", &[]);
        let source = Arc::new(source);
        let indexer = CuratedIndexer::new(
            source,
            AggregatorConfig {
                ttl: Duration::from_secs(60),
                ..Default::default()
            },
        );
        let result = indexer.compute_curated_index("a").await.unwrap();
        assert_eq!(result.ttl_ms, 60_000);
        assert!(result.computed_at > 0);
    }
}
