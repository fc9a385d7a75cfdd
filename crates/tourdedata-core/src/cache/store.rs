//! Storage backends for the memoizing cache.
//!
//! A store holds one partition per cached operation. Entries are
//! `CachedData<serde_json::Value>` envelopes addressed by the encoded
//! argument key.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::manager::{age_display, CachedData};

/// Entry count and freshness of one partition
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionStats {
    pub name: String,
    pub entries: usize,
    pub newest: Option<DateTime<Utc>>,
}

impl PartitionStats {
    pub fn newest_display(&self) -> String {
        self.newest
            .map(age_display)
            .unwrap_or_else(|| "never".to_string())
    }
}

pub trait CacheStore: Send + Sync {
    fn load(&self, partition: &str, key: &str) -> Result<Option<CachedData<Value>>>;

    /// Insert or replace the entry for `entry.key`
    fn save(&self, partition: &str, entry: &CachedData<Value>) -> Result<()>;

    /// Remove one partition, or all of them; returns the number of entries removed
    fn clear(&self, partition: Option<&str>) -> Result<usize>;

    fn partitions(&self) -> Result<Vec<PartitionStats>>;

    /// Make all saved entries durable
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// Disk
// ============================================================================

/// `<root>/<partition>/<sha256(key)>.json`, written through on every save
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create cache directory: {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn partition_dir(&self, partition: &str) -> PathBuf {
        self.root.join(partition)
    }

    fn entry_path(&self, partition: &str, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.partition_dir(partition)
            .join(format!("{:x}.json", digest))
    }

    fn entry_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Failed to list cache partition: {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                files.push(path);
            }
        }
        Ok(files)
    }

    fn partition_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)
            .with_context(|| format!("Failed to list cache directory: {}", self.root.display()))?
        {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn clear_partition(&self, partition: &str) -> Result<usize> {
        let dir = self.partition_dir(partition);
        if !dir.exists() {
            return Ok(0);
        }
        let removed = Self::entry_files(&dir)?.len();
        std::fs::remove_dir_all(&dir)
            .with_context(|| format!("Failed to remove cache partition: {}", partition))?;
        Ok(removed)
    }
}

impl CacheStore for DiskStore {
    fn load(&self, partition: &str, key: &str) -> Result<Option<CachedData<Value>>> {
        let path = self.entry_path(partition, key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache entry: {}/{}", partition, key))?;

        let cached: CachedData<Value> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache entry: {}/{}", partition, key))?;

        if cached.key != key {
            warn!(partition, key, stored = %cached.key, "Cache file name collision, ignoring entry");
            return Ok(None);
        }
        Ok(Some(cached))
    }

    fn save(&self, partition: &str, entry: &CachedData<Value>) -> Result<()> {
        std::fs::create_dir_all(self.partition_dir(partition))?;
        let path = self.entry_path(partition, &entry.key);
        let tmp = path.with_extension("json.tmp");

        let contents = serde_json::to_string_pretty(entry)?;
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write cache entry: {}/{}", partition, entry.key))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to commit cache entry: {}/{}", partition, entry.key))?;
        Ok(())
    }

    fn clear(&self, partition: Option<&str>) -> Result<usize> {
        match partition {
            Some(name) => self.clear_partition(name),
            None => {
                let mut removed = 0;
                for name in self.partition_names()? {
                    removed += self.clear_partition(&name)?;
                }
                Ok(removed)
            }
        }
    }

    fn partitions(&self) -> Result<Vec<PartitionStats>> {
        let mut stats = Vec::new();
        for name in self.partition_names()? {
            let files = Self::entry_files(&self.partition_dir(&name))?;
            let newest = files
                .iter()
                .filter_map(|f| std::fs::metadata(f).and_then(|m| m.modified()).ok())
                .max()
                .map(DateTime::<Utc>::from);
            stats.push(PartitionStats {
                name,
                entries: files.len(),
                newest,
            });
        }
        Ok(stats)
    }

    fn flush(&self) -> Result<()> {
        debug!(root = %self.root.display(), "Disk cache is write-through, nothing to flush");
        Ok(())
    }
}

// ============================================================================
// Memory
// ============================================================================

/// Process-local store; entries are lost when it is dropped
#[derive(Default)]
pub struct MemoryStore {
    partitions: Mutex<HashMap<String, HashMap<String, CachedData<Value>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, HashMap<String, CachedData<Value>>>>> {
        self.partitions
            .lock()
            .map_err(|_| anyhow!("Memory cache lock poisoned"))
    }
}

impl CacheStore for MemoryStore {
    fn load(&self, partition: &str, key: &str) -> Result<Option<CachedData<Value>>> {
        Ok(self
            .lock()?
            .get(partition)
            .and_then(|p| p.get(key))
            .cloned())
    }

    fn save(&self, partition: &str, entry: &CachedData<Value>) -> Result<()> {
        self.lock()?
            .entry(partition.to_string())
            .or_default()
            .insert(entry.key.clone(), entry.clone());
        Ok(())
    }

    fn clear(&self, partition: Option<&str>) -> Result<usize> {
        let mut partitions = self.lock()?;
        let removed = match partition {
            Some(name) => partitions.remove(name).map(|p| p.len()).unwrap_or(0),
            None => partitions.drain().map(|(_, p)| p.len()).sum(),
        };
        Ok(removed)
    }

    fn partitions(&self) -> Result<Vec<PartitionStats>> {
        let partitions = self.lock()?;
        let mut stats: Vec<PartitionStats> = partitions
            .iter()
            .map(|(name, entries)| PartitionStats {
                name: name.clone(),
                entries: entries.len(),
                newest: entries.values().map(|e| e.cached_at).max(),
            })
            .collect();
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(key: &str, value: Value) -> CachedData<Value> {
        CachedData::new(key.to_string(), value)
    }

    #[test]
    fn test_disk_store_roundtrip_and_partitions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DiskStore::new(dir.path().join("cache")).expect("store");

        assert!(store.load("rider", "[\"rider/a\"]").unwrap().is_none());
        store.save("rider", &entry("[\"rider/a\"]", json!({"name": "A"}))).unwrap();
        store.save("rider", &entry("[\"rider/b\"]", json!({"name": "B"}))).unwrap();
        store.save("team", &entry("[\"team/x\"]", json!({"name": "X"}))).unwrap();

        let loaded = store.load("rider", "[\"rider/a\"]").unwrap().expect("entry");
        assert_eq!(loaded.data, json!({"name": "A"}));
        assert!(store.load("team", "[\"rider/a\"]").unwrap().is_none());

        let stats = store.partitions().unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].name, "rider");
        assert_eq!(stats[0].entries, 2);
        assert!(stats[0].newest.is_some());
    }

    #[test]
    fn test_disk_store_leaves_no_temp_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DiskStore::new(dir.path().to_path_buf()).expect("store");
        store.save("nation", &entry("[2024,\"nation/italy\"]", json!(1))).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path().join("nation"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".json"));
    }

    #[test]
    fn test_disk_store_clear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DiskStore::new(dir.path().to_path_buf()).expect("store");
        store.save("a", &entry("1", json!(1))).unwrap();
        store.save("a", &entry("2", json!(2))).unwrap();
        store.save("b", &entry("1", json!(1))).unwrap();

        assert_eq!(store.clear(Some("a")).unwrap(), 2);
        assert_eq!(store.clear(Some("missing")).unwrap(), 0);
        assert_eq!(store.clear(None).unwrap(), 1);
        assert!(store.partitions().unwrap().is_empty());
    }

    #[test]
    fn test_disk_store_rejects_corrupt_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DiskStore::new(dir.path().to_path_buf()).expect("store");
        store.save("rider", &entry("k", json!(1))).unwrap();
        std::fs::write(store.entry_path("rider", "k"), "{not json").unwrap();
        assert!(store.load("rider", "k").is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        store.save("a", &entry("1", json!("x"))).unwrap();
        assert_eq!(store.load("a", "1").unwrap().unwrap().data, json!("x"));
        assert!(store.load("b", "1").unwrap().is_none());
        assert_eq!(store.partitions().unwrap()[0].entries, 1);
        assert_eq!(store.clear(None).unwrap(), 1);
    }
}
