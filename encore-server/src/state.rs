//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use std::sync::Arc;

use encore_core::{CuratedIndexCache, CuratedIndexService, CuratedIndexer, PhotoSource};

use crate::config::Config;

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Cache-backed curated index service, built once at startup
    pub service: Arc<CuratedIndexService>,
    /// Photo API used by the proxy and folder routes
    pub source: Arc<dyn PhotoSource>,
    /// Folder holding the per-region band folders
    pub folder_root: String,
}

impl AppState {
    /// Wire the curated index service and proxies around one photo source.
    pub fn new(source: Arc<dyn PhotoSource>, config: &Config) -> Self {
        let aggregator = config.aggregator();
        let cache = Arc::new(CuratedIndexCache::new(
            config.cache_dir.clone(),
            aggregator.ttl,
        ));
        let indexer = CuratedIndexer::new(Arc::clone(&source), aggregator);

        Self {
            service: Arc::new(CuratedIndexService::new(indexer, cache)),
            source,
            folder_root: config.folder_root.clone(),
        }
    }
}
