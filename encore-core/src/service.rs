//! Cache-backed curated-index service.
//!
//! Ties the [`CuratedIndexer`] to the [`CuratedIndexCache`]: serve fresh
//! cached results, recompute on a miss or a forced refresh, write back.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::aggregator::CuratedIndexer;
use crate::cache::{CacheLayer, CuratedIndexCache};
use crate::error::Result;
use crate::index::CuratedIndexResult;

/// How a response was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    /// `true` when the result came from either cache tier.
    pub hit: bool,
    pub layer: CacheLayer,
    /// Age of the result in whole seconds.
    pub age_sec: u64,
}

impl CacheStatus {
    fn new(hit: bool, layer: CacheLayer, result: &CuratedIndexResult) -> Self {
        Self {
            hit,
            layer,
            age_sec: result.age_ms(Utc::now().timestamp_millis()) / 1000,
        }
    }
}

/// Curated-index lookups for the HTTP and CLI front ends.
///
/// Constructed once at startup. Concurrent misses for the same album each
/// run their own computation; the last write wins.
pub struct CuratedIndexService {
    indexer: CuratedIndexer,
    cache: Arc<CuratedIndexCache>,
}

impl CuratedIndexService {
    pub fn new(indexer: CuratedIndexer, cache: Arc<CuratedIndexCache>) -> Self {
        Self { indexer, cache }
    }

    pub fn cache(&self) -> &CuratedIndexCache {
        &self.cache
    }

    /// Return the curated index for an album, computing it when needed.
    ///
    /// With `refresh` set, both cache tiers are bypassed and the new result's
    /// `computedAt` is strictly newer than any previously cached one.
    #[instrument(level = "info", skip(self))]
    pub async fn curated_index(
        &self,
        album_id: &str,
        refresh: bool,
    ) -> Result<(CuratedIndexResult, CacheStatus)> {
        if !refresh {
            if let Some(hit) = self.cache.get(album_id, false).await {
                debug!(layer = %hit.layer, "Cache hit");
                let status = CacheStatus::new(true, hit.layer, &hit.result);
                return Ok((hit.result, status));
            }
        }

        let previous = if refresh {
            self.cache
                .get(album_id, true)
                .await
                .map(|hit| hit.result.computed_at)
        } else {
            None
        };

        let mut result = self.indexer.compute_curated_index(album_id).await?;

        if let Some(previous) = previous {
            if result.computed_at <= previous {
                result.computed_at = previous + 1;
            }
        }

        self.cache.put(album_id, &result).await;
        info!(refresh, computed_at = result.computed_at, "Curated index stored");

        let status = CacheStatus::new(false, CacheLayer::Computed, &result);
        Ok((result, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::AggregatorConfig;
    use crate::error::EncoreError;
    use crate::index::IndexInputs;
    use crate::upstream::MockPhotoSource;
    use tempfile::TempDir;

    fn service(source: Arc<MockPhotoSource>, dir: &TempDir) -> CuratedIndexService {
        let config = AggregatorConfig::default();
        let cache = Arc::new(CuratedIndexCache::new(dir.path(), config.ttl));
        CuratedIndexService::new(CuratedIndexer::new(source, config), cache)
    }

    fn source() -> Arc<MockPhotoSource> {
        Arc::new(
            MockPhotoSource::new()
                .with_album("alb", &["Encore"])
                .with_image("alb", "i1", &["encore"]),
        )
    }

    #[tokio::test]
    async fn test_miss_then_memory_hit() {
        let dir = TempDir::new().unwrap();
        let src = source();
        let svc = service(src.clone(), &dir);

        let (first, status) = svc.curated_index("alb", false).await.unwrap();
        assert!(!status.hit);
        assert_eq!(status.layer, CacheLayer::Computed);
        assert_eq!(first.verified_keywords, vec!["Encore"]);

        let (second, status) = svc.curated_index("alb", false).await.unwrap();
        assert!(status.hit);
        assert_eq!(status.layer, CacheLayer::Memory);
        assert_eq!(second, first);
        assert_eq!(src.meta_calls(), 1);
    }

    #[tokio::test]
    async fn test_disk_hit_after_restart() {
        let dir = TempDir::new().unwrap();
        let src = source();
        service(src.clone(), &dir)
            .curated_index("alb", false)
            .await
            .unwrap();

        let (_, status) = service(src.clone(), &dir)
            .curated_index("alb", false)
            .await
            .unwrap();
        assert_eq!(status.layer, CacheLayer::Disk);
        assert_eq!(src.meta_calls(), 1);
    }

    #[tokio::test]
    async fn test_forced_refresh_is_strictly_newer() {
        let dir = TempDir::new().unwrap();
        let src = source();
        let svc = service(src.clone(), &dir);

        // Seed an entry stamped in the future so the clock cannot have passed it.
        let future = Utc::now().timestamp_millis() + 60_000;
        let seeded = CuratedIndexResult::verify("alb", IndexInputs::default(), 1, future);
        svc.cache().put("alb", &seeded).await;

        let (result, status) = svc.curated_index("alb", true).await.unwrap();
        assert_eq!(status.layer, CacheLayer::Computed);
        assert!(result.computed_at > future);
        assert_eq!(src.meta_calls(), 1);

        let (cached, _) = svc.curated_index("alb", false).await.unwrap();
        assert_eq!(cached.computed_at, result.computed_at);
    }

    #[tokio::test]
    async fn test_refresh_recomputes_fresh_entry() {
        let dir = TempDir::new().unwrap();
        let src = source();
        let svc = service(src.clone(), &dir);

        let (first, _) = svc.curated_index("alb", false).await.unwrap();
        let (second, status) = svc.curated_index("alb", true).await.unwrap();
        assert!(!status.hit);
        assert!(second.computed_at > first.computed_at);
        assert_eq!(src.meta_calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let src = Arc::new(
            MockPhotoSource::new()
                .with_failing_album_meta("alb")
                .with_failing_page("alb", 1),
        );
        let svc = service(src, &dir);

        let err = svc.curated_index("alb", false).await.unwrap_err();
        assert!(matches!(err, EncoreError::AggregationFailure { .. }));
        assert_eq!(svc.cache().memory_len(), 0);
    }

    #[test]
    fn test_cache_status_serializes_age_sec() {
        let result = CuratedIndexResult::verify(
            "a",
            IndexInputs::default(),
            1,
            Utc::now().timestamp_millis() - 5_500,
        );
        let status = CacheStatus::new(true, CacheLayer::Disk, &result);
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(json["layer"], "disk");
        assert!(json["ageSec"].as_u64().unwrap() >= 5);
    }
}
