// src/cache/store.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tokio::fs;

/// Durable record of the best estimate ever produced for one URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry {
    pub url_hash: String, // SHA-256 hex of the raw URL
    pub source_name: String,
    pub extracted_date: DateTime<Utc>,
    pub method: String,
    pub confidence: f32,
    pub details: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_verified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub verification_count: u32,
    pub is_valid: bool,
}

/// Persistence collaborator behind the in-process tier.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, url_hash: &str) -> Result<Option<CacheEntry>>;
    async fn put(&self, entry: &CacheEntry) -> Result<()>;
    /// Remove entries created before `instant`. Returns how many were removed.
    async fn delete_older_than(&self, instant: DateTime<Utc>) -> Result<usize>;
    /// Mark valid entries below `threshold` invalid. Returns how many changed.
    async fn invalidate_below_confidence(&self, threshold: f32) -> Result<usize>;
    fn name(&self) -> &'static str;
}

/// Process-local store (tests, ephemeral runs).
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, url_hash: &str) -> Result<Option<CacheEntry>> {
        let g = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(g.get(url_hash).cloned())
    }

    async fn put(&self, entry: &CacheEntry) -> Result<()> {
        let mut g = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        g.insert(entry.url_hash.clone(), entry.clone());
        Ok(())
    }

    async fn delete_older_than(&self, instant: DateTime<Utc>) -> Result<usize> {
        let mut g = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = g.len();
        g.retain(|_, e| e.created_at >= instant);
        Ok(before - g.len())
    }

    async fn invalidate_below_confidence(&self, threshold: f32) -> Result<usize> {
        let mut g = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut n = 0;
        for e in g.values_mut() {
            if e.is_valid && e.confidence < threshold {
                e.is_valid = false;
                n += 1;
            }
        }
        Ok(n)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// One JSON document per url hash under a directory.
/// Writes go through a temp file + rename so readers never see partial JSON.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("creating cache dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, url_hash: &str) -> Result<PathBuf> {
        if url_hash.is_empty() || !url_hash.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!("invalid url hash '{url_hash}'");
        }
        Ok(self.dir.join(format!("{url_hash}.json")))
    }

    async fn write_entry(&self, path: &Path, entry: &CacheEntry) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec(entry).context("serializing cache entry")?;
        fs::write(&tmp, json)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .await
            .with_context(|| format!("renaming into {}", path.display()))?;
        Ok(())
    }

    /// All parseable entries with their paths; unreadable files are skipped.
    async fn scan(&self) -> Result<Vec<(PathBuf, CacheEntry)>> {
        let mut out = Vec::new();
        let mut rd = fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("listing {}", self.dir.display()))?;
        while let Some(e) = rd.next_entry().await? {
            let path = e.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Ok(raw) = fs::read(&path).await else {
                continue;
            };
            match serde_json::from_slice::<CacheEntry>(&raw) {
                Ok(entry) => out.push((path, entry)),
                Err(err) => {
                    tracing::warn!(target: "date_cache", path = %path.display(), error = %err, "skipping corrupt cache file");
                }
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl CacheStore for JsonFileStore {
    async fn get(&self, url_hash: &str) -> Result<Option<CacheEntry>> {
        let path = self.path_for(url_hash)?;
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        let entry = serde_json::from_slice(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(entry))
    }

    async fn put(&self, entry: &CacheEntry) -> Result<()> {
        let path = self.path_for(&entry.url_hash)?;
        self.write_entry(&path, entry).await
    }

    async fn delete_older_than(&self, instant: DateTime<Utc>) -> Result<usize> {
        let mut n = 0;
        for (path, entry) in self.scan().await? {
            if entry.created_at < instant {
                match fs::remove_file(&path).await {
                    Ok(()) => n += 1,
                    // Removed concurrently.
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e).with_context(|| format!("removing {}", path.display())),
                }
            }
        }
        Ok(n)
    }

    async fn invalidate_below_confidence(&self, threshold: f32) -> Result<usize> {
        let mut n = 0;
        for (path, mut entry) in self.scan().await? {
            if entry.is_valid && entry.confidence < threshold {
                entry.is_valid = false;
                self.write_entry(&path, &entry).await?;
                n += 1;
            }
        }
        Ok(n)
    }

    fn name(&self) -> &'static str {
        "json_file"
    }
}
