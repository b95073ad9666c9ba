//! Record persistence: one JSON file per record behind an in-memory cache

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{DigestError, Result};
use crate::models::PodcastRecord;

/// Persisted record store
#[async_trait]
pub trait PodcastStore: Send + Sync {
    /// Insert a new record; fails with `Conflict` on a taken id or slug
    async fn insert(&self, record: PodcastRecord) -> Result<PodcastRecord>;

    async fn get(&self, id: &str) -> Result<Option<PodcastRecord>>;

    /// Exact lookup by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<PodcastRecord>>;

    /// All records, newest first
    async fn list(&self) -> Result<Vec<PodcastRecord>>;

    /// Replace a record by id; its slug may not collide with another record
    async fn update(&self, record: PodcastRecord) -> Result<PodcastRecord>;

    /// Delete by id, returning the removed record
    async fn delete(&self, id: &str) -> Result<PodcastRecord>;
}

/// Store keeping one JSON file per record, cached in memory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    /// Directory for record files
    records_dir: PathBuf,

    /// Records keyed by id
    cache: Arc<RwLock<HashMap<String, PodcastRecord>>>,
}

impl JsonFileStore {
    /// Open a store, creating the directory and loading existing records
    pub async fn open(records_dir: impl Into<PathBuf>) -> Result<Self> {
        let records_dir = records_dir.into();
        fs::create_dir_all(&records_dir).await?;

        let store = Self {
            records_dir,
            cache: Arc::new(RwLock::new(HashMap::new())),
        };
        let loaded = store.load_existing_records().await?;

        info!(
            "📚 Record store opened at {} with {} records",
            store.records_dir.display(),
            loaded
        );
        Ok(store)
    }

    pub fn records_dir(&self) -> &Path {
        &self.records_dir
    }

    async fn load_existing_records(&self) -> Result<usize> {
        let mut entries = fs::read_dir(&self.records_dir).await?;
        let mut cache = self.cache.write().await;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            match Self::load_record_file(&path).await {
                Ok(record) => {
                    cache.insert(record.id.clone(), record);
                }
                Err(e) => {
                    warn!("Failed to load record file {}: {}", path.display(), e);
                }
            }
        }

        Ok(cache.len())
    }

    async fn load_record_file(path: &Path) -> Result<PodcastRecord> {
        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// File for a record id; ids are limited to ASCII letters, digits and `-`
    fn record_path(&self, id: &str) -> Result<PathBuf> {
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(DigestError::Validation(format!(
                "record id {:?} may only contain ASCII letters, digits and '-'",
                id
            )));
        }
        Ok(self.records_dir.join(format!("{}.json", id)))
    }

    async fn write_record(&self, record: &PodcastRecord) -> Result<()> {
        let path = self.record_path(&record.id)?;
        let json = serde_json::to_string_pretty(record)?;
        fs::write(path, json)
            .await
            .map_err(|e| DigestError::Storage(format!("failed to write record {}: {}", record.id, e)))
    }
}

fn slug_taken(cache: &HashMap<String, PodcastRecord>, slug: &str, except_id: Option<&str>) -> bool {
    cache
        .values()
        .any(|r| r.slug == slug && Some(r.id.as_str()) != except_id)
}

#[async_trait]
impl PodcastStore for JsonFileStore {
    async fn insert(&self, record: PodcastRecord) -> Result<PodcastRecord> {
        self.record_path(&record.id)?;
        let mut cache = self.cache.write().await;

        if cache.contains_key(&record.id) {
            return Err(DigestError::Conflict(format!("record {} already exists", record.id)));
        }
        if slug_taken(&cache, &record.slug, None) {
            return Err(DigestError::Conflict(format!("slug {} is taken", record.slug)));
        }

        self.write_record(&record).await?;
        cache.insert(record.id.clone(), record.clone());

        debug!("💾 Inserted record {} ({})", record.id, record.slug);
        Ok(record)
    }

    async fn get(&self, id: &str) -> Result<Option<PodcastRecord>> {
        Ok(self.cache.read().await.get(id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<PodcastRecord>> {
        Ok(self
            .cache
            .read()
            .await
            .values()
            .find(|r| r.slug == slug)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<PodcastRecord>> {
        let mut records: Vec<PodcastRecord> = self.cache.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn update(&self, record: PodcastRecord) -> Result<PodcastRecord> {
        let mut cache = self.cache.write().await;

        if !cache.contains_key(&record.id) {
            return Err(DigestError::NotFound(format!("record {}", record.id)));
        }
        if slug_taken(&cache, &record.slug, Some(&record.id)) {
            return Err(DigestError::Conflict(format!("slug {} is taken", record.slug)));
        }

        self.write_record(&record).await?;
        cache.insert(record.id.clone(), record.clone());

        debug!("💾 Updated record {}", record.id);
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<PodcastRecord> {
        let mut cache = self.cache.write().await;

        if !cache.contains_key(id) {
            return Err(DigestError::NotFound(format!("record {}", id)));
        }

        let path = self.record_path(id)?;
        if path.exists() {
            fs::remove_file(&path)
                .await
                .map_err(|e| DigestError::Storage(format!("failed to delete record {}: {}", id, e)))?;
        }

        let removed = cache
            .remove(id)
            .ok_or_else(|| DigestError::NotFound(format!("record {}", id)))?;
        info!("🗑️ Deleted record {} ({})", removed.id, removed.slug);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PodcastSummary;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn record(id: &str, slug: &str, age_days: i64) -> PodcastRecord {
        PodcastRecord {
            id: id.to_string(),
            slug: slug.to_string(),
            title: format!("Title {}", id),
            podcast_name: "Show".to_string(),
            creator: "Host".to_string(),
            source_link: "https://youtu.be/abc".to_string(),
            thumbnail_url: String::new(),
            duration_minutes: 30,
            rating: 5,
            tags: vec!["tag".to_string()],
            summary: PodcastSummary::default(),
            key_takeaways: Vec::new(),
            actionable_advice: Vec::new(),
            resources: Vec::new(),
            user_id: "owner".to_string(),
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        store.insert(record("1", "first-aaaaa", 0)).await.unwrap();

        let by_slug = store.get_by_slug("first-aaaaa").await.unwrap().unwrap();
        assert_eq!(by_slug.id, "1");
        assert_eq!(store.get("1").await.unwrap().unwrap().slug, "first-aaaaa");
        assert!(store.get_by_slug("first").await.unwrap().is_none());
        assert!(dir.path().join("1.json").exists());
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        store.insert(record("1", "same-slug", 0)).await.unwrap();
        let result = store.insert(record("2", "same-slug", 0)).await;

        assert!(matches!(result, Err(DigestError::Conflict(_))));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        store.insert(record("1", "a", 0)).await.unwrap();
        assert!(matches!(
            store.insert(record("1", "b", 0)).await,
            Err(DigestError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        store.insert(record("old", "old", 10)).await.unwrap();
        store.insert(record("new", "new", 0)).await.unwrap();
        store.insert(record("mid", "mid", 5)).await.unwrap();

        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_reload_from_disk() {
        let dir = TempDir::new().unwrap();
        {
            let store = JsonFileStore::open(dir.path()).await.unwrap();
            store.insert(record("1", "one", 0)).await.unwrap();
            store.insert(record("2", "two", 1)).await.unwrap();
        }
        tokio::fs::write(dir.path().join("garbage.json"), "not json").await.unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), "ignored").await.unwrap();

        let reopened = JsonFileStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.list().await.unwrap().len(), 2);
        assert_eq!(reopened.get_by_slug("two").await.unwrap().unwrap().id, "2");
    }

    #[tokio::test]
    async fn test_update_replaces_record() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        store.insert(record("1", "one", 0)).await.unwrap();
        store.insert(record("2", "two", 0)).await.unwrap();

        let mut edited = record("1", "one", 0);
        edited.title = "Edited".to_string();
        store.update(edited).await.unwrap();
        assert_eq!(store.get("1").await.unwrap().unwrap().title, "Edited");

        let clash = record("1", "two", 0);
        assert!(matches!(store.update(clash).await, Err(DigestError::Conflict(_))));

        let missing = record("3", "three", 0);
        assert!(matches!(store.update(missing).await, Err(DigestError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        store.insert(record("1", "one", 0)).await.unwrap();

        let removed = store.delete("1").await.unwrap();
        assert_eq!(removed.slug, "one");
        assert!(store.get("1").await.unwrap().is_none());
        assert!(!dir.path().join("1.json").exists());

        assert!(matches!(store.delete("1").await, Err(DigestError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_ids_outside_file_safe_alphabet_rejected() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        for id in ["a/b", "../escape", "a_b", ""] {
            assert!(matches!(
                store.insert(record(id, id, 0)).await,
                Err(DigestError::Validation(_))
            ));
        }
        assert!(store.list().await.unwrap().is_empty());

        let id = "0b9f6c1e-5d2a-4f3b-9a77-1c2d3e4f5a6b";
        store.insert(record(id, "uuid", 0)).await.unwrap();
        assert_eq!(
            store.record_path(id).unwrap(),
            dir.path().join(format!("{}.json", id))
        );
    }
}
