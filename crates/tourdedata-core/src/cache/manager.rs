use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::store::{CacheStore, DiskStore, MemoryStore, PartitionStats};

/// Envelope stored for every cache entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedData<T> {
    /// Encoded call arguments
    pub key: String,
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(key: String, data: T) -> Self {
        Self {
            key,
            data,
            cached_at: Utc::now(),
        }
    }
}

/// Human readable age of a timestamp: "just now", "5m ago", "3h ago", "2d ago"
pub fn age_display(at: DateTime<Utc>) -> String {
    let minutes = (Utc::now() - at).num_minutes();
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

/// Persistent memoization handle.
///
/// Open one per process, hand it to the enrichment layer, and `close()` it
/// at the end of the run. Entries never expire; they are removed only by
/// [`Cache::clear`] or by deleting the files.
pub struct Cache {
    store: Box<dyn CacheStore>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Cache {
    pub fn with_store(store: impl CacheStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Disk-backed cache rooted at `dir`
    pub fn open(dir: PathBuf) -> Result<Self> {
        info!(dir = %dir.display(), "Opening cache");
        Ok(Self::with_store(DiskStore::new(dir)?))
    }

    pub fn in_memory() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// Deterministic key for a set of call arguments.
    ///
    /// Compact JSON of the arguments, so distinct values and orders give
    /// distinct keys. Strings are taken as-is: keys are case-sensitive.
    pub fn encode_key<A: Serialize + ?Sized>(args: &A) -> Result<String> {
        serde_json::to_string(args).context("Failed to encode cache key")
    }

    fn check_namespace(namespace: &str) -> Result<()> {
        let valid = !namespace.is_empty()
            && namespace
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
        if !valid {
            bail!("Invalid cache namespace: {:?}", namespace);
        }
        Ok(())
    }

    /// Return the cached result for `(namespace, args)`, or run `compute`,
    /// store its result and return it.
    ///
    /// Errors from `compute` propagate and nothing is stored. A stored entry
    /// that cannot be read back is logged and recomputed.
    pub async fn call<A, T, F, Fut>(&self, namespace: &str, args: &A, compute: F) -> Result<T>
    where
        A: Serialize + ?Sized,
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        Self::check_namespace(namespace)?;
        let key = Self::encode_key(args)?;

        match self.store.load(namespace, &key) {
            Ok(Some(cached)) => match serde_json::from_value::<T>(cached.data) {
                Ok(value) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(namespace, key = %key, "Cache hit");
                    return Ok(value);
                }
                Err(e) => {
                    warn!(namespace, key = %key, error = %e, "Cached entry has unexpected shape, refetching");
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(namespace, key = %key, error = %e, "Failed to load cache entry, refetching");
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(namespace, key = %key, "Cache miss");
        let value = compute().await?;

        let data: Value = serde_json::to_value(&value)
            .with_context(|| format!("Failed to serialize result for {}", namespace))?;
        self.store.save(namespace, &CachedData::new(key, data))?;
        Ok(value)
    }

    pub fn clear(&self, namespace: Option<&str>) -> Result<usize> {
        if let Some(ns) = namespace {
            Self::check_namespace(ns)?;
        }
        self.store.clear(namespace)
    }

    pub fn stats(&self) -> Result<Vec<PartitionStats>> {
        self.store.partitions()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Flush the store and log usage for the run
    pub fn close(self) -> Result<()> {
        self.store.flush()?;
        info!(hits = self.hits(), misses = self.misses(), "Cache closed");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::cell::Cell;

    #[test]
    fn test_age_display() {
        let now = Utc::now();
        assert_eq!(age_display(now), "just now");
        assert_eq!(age_display(now + Duration::minutes(5)), "just now");
        assert_eq!(age_display(now - Duration::minutes(5)), "5m ago");
        assert_eq!(age_display(now - Duration::minutes(95)), "2h ago");
        assert_eq!(age_display(now - Duration::hours(26)), "1d ago");
        assert_eq!(age_display(now - Duration::hours(40)), "2d ago");
    }

    #[tokio::test]
    async fn test_call_runs_compute_once() {
        let cache = Cache::in_memory();
        let calls = Cell::new(0);

        let first: Vec<String> = cache
            .call("teams", &(2024,), || async {
                calls.set(calls.get() + 1);
                Ok(vec!["team/a".to_string()])
            })
            .await
            .unwrap();

        // A live refetch would now return something else
        let second: Vec<String> = cache
            .call("teams", &(2024,), || async {
                calls.set(calls.get() + 1);
                Ok(vec!["team/b".to_string()])
            })
            .await
            .unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(first, second);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[tokio::test]
    async fn test_keys_are_case_sensitive_and_order_sensitive() {
        let cache = Cache::in_memory();
        let calls = Cell::new(0);

        for args in [(2024, "italy"), (2024, "Italy")] {
            let _: u32 = cache
                .call("nation_riders", &args, || async {
                    calls.set(calls.get() + 1);
                    Ok(1)
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.get(), 2);

        assert_ne!(
            Cache::encode_key(&(2024, 2025)).unwrap(),
            Cache::encode_key(&(2025, 2024)).unwrap()
        );
        assert_ne!(
            Cache::encode_key(&("a b", "c")).unwrap(),
            Cache::encode_key(&("a", "b c")).unwrap()
        );
    }

    #[tokio::test]
    async fn test_namespaces_do_not_collide() {
        let cache = Cache::in_memory();
        let a: String = cache.call("team", &("x",), || async { Ok("team".to_string()) }).await.unwrap();
        let b: String = cache.call("rider", &("x",), || async { Ok("rider".to_string()) }).await.unwrap();
        assert_eq!(a, "team");
        assert_eq!(b, "rider");
        assert_eq!(cache.misses(), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = Cache::in_memory();

        let failed: Result<u32> = cache
            .call("rider", &("rider/x",), || async { bail!("timeout") })
            .await;
        assert!(failed.is_err());

        let value: u32 = cache
            .call("rider", &("rider/x",), || async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(cache.stats().unwrap()[0].entries, 1);
    }

    #[tokio::test]
    async fn test_invalid_namespace_is_rejected() {
        let cache = Cache::in_memory();
        let result: Result<u32> = cache.call("../etc", &(1,), || async { Ok(1) }).await;
        assert!(result.is_err());
        assert!(cache.clear(Some("Bad Name")).is_err());
    }

    #[tokio::test]
    async fn test_disk_cache_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");

        let cache = Cache::open(dir.path().to_path_buf()).unwrap();
        let _: Vec<u32> = cache.call("team_wins", &(2020,), || async { Ok(vec![1, 2]) }).await.unwrap();
        cache.close().unwrap();

        let reopened = Cache::open(dir.path().to_path_buf()).unwrap();
        let value: Vec<u32> = reopened
            .call("team_wins", &(2020,), || async { bail!("should not be called") })
            .await
            .unwrap();
        assert_eq!(value, vec![1, 2]);
        assert_eq!(reopened.hits(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_refetched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = Cache::open(dir.path().to_path_buf()).unwrap();
        let _: u32 = cache.call("rider", &("r",), || async { Ok(1) }).await.unwrap();

        let partition = dir.path().join("rider");
        for file in std::fs::read_dir(&partition).unwrap() {
            std::fs::write(file.unwrap().path(), "garbage").unwrap();
        }

        let value: u32 = cache.call("rider", &("r",), || async { Ok(2) }).await.unwrap();
        assert_eq!(value, 2);
        let again: u32 = cache.call("rider", &("r",), || async { Ok(3) }).await.unwrap();
        assert_eq!(again, 2);
    }
}
