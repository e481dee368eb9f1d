//! Two-tier cache for curated-index results.
//!
//! - **Memory** (`DashMap`): authoritative hot state for the running process.
//! - **Disk** (one JSON file per album): survives restarts.
//!
//! Freshness is computed from the stored `computedAt` against the configured
//! TTL on every lookup; nothing expires on a timer. Disk writes are
//! best-effort: failures are logged and never reach the caller.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EncoreError, Result};
use crate::index::CuratedIndexResult;

/// Where a returned result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum CacheLayer {
    Memory,
    Disk,
    Computed,
}

impl std::fmt::Display for CacheLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Disk => write!(f, "disk"),
            Self::Computed => write!(f, "computed"),
        }
    }
}

/// A cached result and the tier that served it.
#[derive(Debug, Clone)]
pub struct CacheHit {
    pub result: CuratedIndexResult,
    pub layer: CacheLayer,
}

/// Memory + disk cache keyed by album identifier.
pub struct CuratedIndexCache {
    memory: DashMap<String, CuratedIndexResult>,
    dir: PathBuf,
    ttl: Duration,
}

impl CuratedIndexCache {
    /// Create a cache storing files under `dir`. The directory is created lazily.
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            memory: DashMap::new(),
            dir: dir.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of entries held in memory.
    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Whether a result is still fresh now.
    pub fn is_fresh(&self, result: &CuratedIndexResult) -> bool {
        self.is_fresh_at(result, Utc::now().timestamp_millis())
    }

    /// Whether a result is fresh at `now_ms`: `now - computedAt < ttl`.
    pub fn is_fresh_at(&self, result: &CuratedIndexResult, now_ms: i64) -> bool {
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_sub(result.computed_at) < ttl_ms
    }

    /// Path of the disk entry for an album.
    ///
    /// Characters outside `[A-Za-z0-9_-]` are replaced with `_`.
    pub fn entry_path(&self, album_id: &str) -> PathBuf {
        let name: String = album_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }

    /// Look up an album: memory first, then disk (promoting disk hits).
    ///
    /// Stale entries are only returned when `allow_stale` is set.
    pub async fn get(&self, album_id: &str, allow_stale: bool) -> Option<CacheHit> {
        // Clone out of the map so no shard lock is held across an await.
        let in_memory = self.memory.get(album_id).map(|entry| entry.value().clone());
        if let Some(result) = in_memory {
            if allow_stale || self.is_fresh(&result) {
                debug!(album_id, "Curated index served from memory");
                return Some(CacheHit {
                    result,
                    layer: CacheLayer::Memory,
                });
            }
        }

        let result = self.read_disk(album_id).await?;
        if !allow_stale && !self.is_fresh(&result) {
            debug!(album_id, "Disk entry is stale");
            return None;
        }

        self.memory.insert(album_id.to_string(), result.clone());
        debug!(album_id, "Curated index promoted from disk");
        Some(CacheHit {
            result,
            layer: CacheLayer::Disk,
        })
    }

    /// Store a result in both tiers. Disk failures are logged and swallowed.
    pub async fn put(&self, album_id: &str, result: &CuratedIndexResult) {
        self.memory.insert(album_id.to_string(), result.clone());

        if let Err(e) = self.write_disk(album_id, result).await {
            warn!(album_id, error = %e, "Failed to persist curated index");
        }
    }

    async fn read_disk(&self, album_id: &str) -> Option<CuratedIndexResult> {
        let path = self.entry_path(album_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read cache entry");
                return None;
            }
        };

        match serde_json::from_slice::<CuratedIndexResult>(&bytes) {
            Ok(result) if result.album_id == album_id => Some(result),
            Ok(result) => {
                warn!(
                    path = %path.display(),
                    stored = %result.album_id,
                    "Cache entry belongs to a different album, ignoring"
                );
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt cache entry, ignoring");
                None
            }
        }
    }

    /// Write through a temporary file so readers never see a partial entry.
    async fn write_disk(&self, album_id: &str, result: &CuratedIndexResult) -> Result<()> {
        let path = self.entry_path(album_id);
        let tmp = path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(result)
            .map_err(|e| EncoreError::CacheWrite(format!("serialize: {e}")))?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            EncoreError::CacheWrite(format!("create {}: {e}", self.dir.display()))
        })?;
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| EncoreError::CacheWrite(format!("write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| EncoreError::CacheWrite(format!("rename {}: {e}", path.display())))?;

        debug!(path = %path.display(), bytes = bytes.len(), "Curated index persisted");
        Ok(())
    }
}

impl std::fmt::Debug for CuratedIndexCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CuratedIndexCache")
            .field("memory_entries", &self.memory.len())
            .field("dir", &self.dir)
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexInputs;
    use tempfile::TempDir;

    const TTL_MS: i64 = 60_000;

    fn cache(dir: &TempDir) -> CuratedIndexCache {
        CuratedIndexCache::new(dir.path(), Duration::from_millis(TTL_MS as u64))
    }

    fn result_at(album_id: &str, computed_at: i64) -> CuratedIndexResult {
        CuratedIndexResult::verify(album_id, IndexInputs::default(), TTL_MS as u64, computed_at)
    }

    #[test]
    fn test_freshness_boundary() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        let now = 1_700_000_000_000;

        assert!(cache.is_fresh_at(&result_at("a", now - TTL_MS + 1), now));
        assert!(!cache.is_fresh_at(&result_at("a", now - TTL_MS - 1), now));
        assert!(!cache.is_fresh_at(&result_at("a", now - TTL_MS), now));
    }

    #[test]
    fn test_entry_path_is_sanitized() {
        let dir = TempDir::new().unwrap();
        let path = cache(&dir).entry_path("../evil/alb um");
        assert_eq!(path, dir.path().join("___evil_alb_um.json"));
    }

    #[tokio::test]
    async fn test_put_then_get_from_memory() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        let result = result_at("alb", Utc::now().timestamp_millis());

        cache.put("alb", &result).await;
        let hit = cache.get("alb", false).await.unwrap();
        assert_eq!(hit.layer, CacheLayer::Memory);
        assert_eq!(hit.result, result);
        assert!(cache.entry_path("alb").exists());
    }

    #[tokio::test]
    async fn test_disk_hit_is_promoted() {
        let dir = TempDir::new().unwrap();
        let result = result_at("alb", Utc::now().timestamp_millis());
        cache(&dir).put("alb", &result).await;

        // A new cache instance simulates a process restart.
        let restarted = cache(&dir);
        assert_eq!(restarted.memory_len(), 0);

        let hit = restarted.get("alb", false).await.unwrap();
        assert_eq!(hit.layer, CacheLayer::Disk);
        assert_eq!(hit.result, result);
        assert_eq!(restarted.memory_len(), 1);

        let again = restarted.get("alb", false).await.unwrap();
        assert_eq!(again.layer, CacheLayer::Memory);
    }

    #[tokio::test]
    async fn test_stale_entries_are_misses_unless_allowed() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        let stale = result_at("alb", Utc::now().timestamp_millis() - TTL_MS * 2);
        cache.put("alb", &stale).await;

        assert!(cache.get("alb", false).await.is_none());
        let hit = cache.get("alb", true).await.unwrap();
        assert_eq!(hit.result.computed_at, stale.computed_at);
    }

    #[tokio::test]
    async fn test_corrupt_disk_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        std::fs::write(cache.entry_path("alb"), b"{not json").unwrap();
        assert!(cache.get("alb", true).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_write_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not a directory").unwrap();

        let cache = CuratedIndexCache::new(blocker.join("cache"), Duration::from_secs(60));
        let result = result_at("alb", Utc::now().timestamp_millis());
        cache.put("alb", &result).await;

        let hit = cache.get("alb", false).await.unwrap();
        assert_eq!(hit.layer, CacheLayer::Memory);
        assert!(!cache.entry_path("alb").exists());
    }

    #[tokio::test]
    async fn test_unknown_album_is_a_miss() {
        let dir = TempDir::new().unwrap();
        assert!(cache(&dir).get("nothing", true).await.is_none());
    }
}
