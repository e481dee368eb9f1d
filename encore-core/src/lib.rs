//! Encore Core - curated-keyword reconciliation for a music photo archive
//!
//! Albums on SmugMug carry editor-curated keywords; their images carry
//! keywords of their own. This crate checks which curated keywords are
//! actually present on at least one image, and caches the answer.
//!
//! # Features
//!
//! - SmugMug API v2 client behind the [`PhotoSource`] trait, plus an in-memory mock
//! - Keyword extraction across the upstream's JSON shapes
//! - Paginated listing and bounded-concurrency image scanning
//! - Two-tier (memory + disk) result cache with TTL freshness
//! - Band-folder resolution from URL slugs
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use encore_core::{
//!     AggregatorConfig, CuratedIndexCache, CuratedIndexService, CuratedIndexer, SmugMugClient,
//! };
//!
//! # async fn example() -> encore_core::Result<()> {
//! let source = Arc::new(SmugMugClient::from_env()?);
//! let config = AggregatorConfig::default();
//! let cache = Arc::new(CuratedIndexCache::new("cache", config.ttl));
//! let service = CuratedIndexService::new(CuratedIndexer::new(source, config), cache);
//!
//! let (index, status) = service.curated_index("hTxK9q", false).await?;
//! println!("{} missing (served from {})", index.missing_keywords.len(), status.layer);
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod cache;
pub mod error;
pub mod index;
pub mod keywords;
pub mod listing;
pub mod resolver;
pub mod service;
pub mod upstream;

// Re-export main types for convenience
pub use aggregator::{AggregatorConfig, CuratedIndexer};
pub use cache::{CacheHit, CacheLayer, CuratedIndexCache};
pub use error::{EncoreError, Result};
pub use index::{CuratedIndexResult, IndexSummary, KeywordVerificationRecord};
pub use keywords::{
    extract_album_keywords, extract_image_keywords, normalize_keyword, KeywordShape,
};
pub use resolver::{folder_candidates, resolve_folder, FolderResolution, Region};
pub use service::{CacheStatus, CuratedIndexService};
pub use upstream::{MockPhotoSource, PhotoSource, SmugMugClient, SmugMugConfig};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// End to end over the mock: compute, cache, serve from memory.
    #[tokio::test]
    async fn test_full_index_workflow() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = Arc::new(
            MockPhotoSource::new()
                .with_album("alb", &["Soundcheck", "Encore"])
                .with_image("alb", "i1", &["Soundcheck", "Crowd"])
                .with_image("alb", "i2", &[" soundcheck "])
                .with_image("alb", "i3", &["Crowd"]),
        );

        let config = AggregatorConfig::default();
        let cache = Arc::new(CuratedIndexCache::new(dir.path(), config.ttl));
        let service = CuratedIndexService::new(CuratedIndexer::new(source, config), cache);

        let (index, status) = service.curated_index("alb", false).await.unwrap();
        assert_eq!(status.layer, CacheLayer::Computed);
        assert_eq!(index.verified_keywords, vec!["Soundcheck"]);
        assert_eq!(index.missing_keywords, vec!["Encore"]);
        assert_eq!(index.frequency.get("soundcheck"), Some(&2));
        assert_eq!(index.frequency.get("crowd"), Some(&2));

        let (_, status) = service.curated_index("alb", false).await.unwrap();
        assert_eq!(status.layer, CacheLayer::Memory);
    }
}
