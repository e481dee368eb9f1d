//! Server configuration module
//!
//! Handles loading configuration from environment variables with sensible defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use encore_core::aggregator::{
    AggregatorConfig, DEFAULT_CONCURRENCY, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, DEFAULT_TTL,
};
use encore_core::resolver::DEFAULT_FOLDER_ROOT;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 3000)
    pub port: u16,
    /// Server host (default: 127.0.0.1)
    pub host: [u8; 4],
    /// Allowed CORS origins, comma-separated (default: allow all in dev)
    pub allowed_origins: Option<Vec<String>>,
    /// Request timeout in seconds (default: 120, a cold index can take a while)
    pub timeout_secs: u64,
    /// Enable rate limiting (default: false for tests, true when loaded from env)
    pub rate_limit_enabled: bool,
    /// Rate limit: requests per second (default: 10)
    pub rate_limit_per_sec: u64,
    /// Rate limit: burst size (default: 20)
    pub rate_limit_burst: u32,
    /// Directory holding one JSON file per album (default: ./cache/curated-index)
    pub cache_dir: PathBuf,
    /// Curated index time-to-live in milliseconds (default: 6 hours)
    pub curated_index_ttl_ms: u64,
    /// Images requested per listing page (default: 200)
    pub image_page_size: usize,
    /// Image detail requests in flight at once (default: 4)
    pub detail_concurrency: usize,
    /// Listing pages fetched before giving up (default: 250)
    pub max_image_pages: usize,
    /// Folder holding the per-region band folders
    pub folder_root: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            host: [127, 0, 0, 1],
            allowed_origins: None, // None = allow all (dev mode)
            timeout_secs: 120,
            rate_limit_enabled: false, // Disabled by default (for tests)
            rate_limit_per_sec: 10,
            rate_limit_burst: 20,
            cache_dir: PathBuf::from("cache/curated-index"),
            curated_index_ttl_ms: DEFAULT_TTL.as_millis() as u64,
            image_page_size: DEFAULT_PAGE_SIZE,
            detail_concurrency: DEFAULT_CONCURRENCY,
            max_image_pages: DEFAULT_MAX_PAGES,
            folder_root: DEFAULT_FOLDER_ROOT.to_string(),
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = std::env::var("HOST")
            .ok()
            .map(|h| {
                if h == "0.0.0.0" {
                    [0, 0, 0, 0]
                } else {
                    [127, 0, 0, 1]
                }
            })
            .unwrap_or(defaults.host);

        let allowed_origins = std::env::var("ALLOWED_ORIGINS").ok().map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        // Rate limiting enabled by default in production, can be disabled with RATE_LIMIT_ENABLED=false
        let rate_limit_enabled = std::env::var("RATE_LIMIT_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let cache_dir = std::env::var("CACHE_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.cache_dir);

        let folder_root = std::env::var("SMUGMUG_FOLDER_ROOT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.folder_root);

        Self {
            port: env_or("PORT", defaults.port),
            host,
            allowed_origins,
            timeout_secs: env_or("REQUEST_TIMEOUT_SECS", defaults.timeout_secs),
            rate_limit_enabled,
            rate_limit_per_sec: env_or("RATE_LIMIT_PER_SEC", defaults.rate_limit_per_sec),
            rate_limit_burst: env_or("RATE_LIMIT_BURST", defaults.rate_limit_burst),
            cache_dir,
            curated_index_ttl_ms: env_or("CURATED_INDEX_TTL_MS", defaults.curated_index_ttl_ms),
            image_page_size: env_or("IMAGE_PAGE_SIZE", defaults.image_page_size),
            detail_concurrency: env_or("DETAIL_CONCURRENCY", defaults.detail_concurrency),
            max_image_pages: env_or("MAX_IMAGE_PAGES", defaults.max_image_pages),
            folder_root,
        }
    }

    /// Get socket address from config
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }

    /// Curated index TTL as a duration
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.curated_index_ttl_ms)
    }

    /// Aggregator tuning derived from this configuration
    pub fn aggregator(&self) -> AggregatorConfig {
        AggregatorConfig {
            page_size: self.image_page_size.max(1),
            concurrency: self.detail_concurrency.max(1),
            max_pages: self.max_image_pages.max(1),
            ttl: self.ttl(),
        }
    }
}
