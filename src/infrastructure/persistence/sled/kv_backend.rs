//! Sled-based KV Backend Implementation
//!
//! 每次写入后 flush，进程被杀或系统休眠时已写入的状态不会丢失

use sled::Db;
use std::path::Path;
use std::sync::Arc;

use crate::application::ports::{KvBackendPort, StorageError};

/// Sled 存储配置
#[derive(Debug, Clone)]
pub struct SledStoreConfig {
    /// 数据库路径
    pub db_path: String,
    /// 每次写入后是否同步落盘
    pub flush_on_write: bool,
}

impl Default for SledStoreConfig {
    fn default() -> Self {
        Self {
            db_path: "data/sumi.sled".to_string(),
            flush_on_write: true,
        }
    }
}

/// Sled 键值后端
pub struct SledKvBackend {
    db: Db,
    flush_on_write: bool,
}

impl SledKvBackend {
    pub fn new(config: &SledStoreConfig) -> Result<Self, StorageError> {
        let db = sled::open(&config.db_path)
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;

        tracing::info!(
            db_path = %config.db_path,
            entries = db.len(),
            flush_on_write = config.flush_on_write,
            "SledKvBackend initialized"
        );

        Ok(Self {
            db,
            flush_on_write: config.flush_on_write,
        })
    }

    /// 打开现有数据库
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let config = SledStoreConfig {
            db_path: path.as_ref().to_string_lossy().to_string(),
            ..SledStoreConfig::default()
        };
        Self::new(&config)
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 刷新数据库
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db
            .flush()
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn flush_if_configured(&self) -> Result<(), StorageError> {
        if self.flush_on_write {
            self.flush()?;
        }
        Ok(())
    }
}

impl KvBackendPort for SledKvBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.db.get(key) {
            Ok(Some(data)) => {
                let value = String::from_utf8(data.to_vec())
                    .map_err(|e| StorageError::SerializationError(e.to_string()))?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StorageError::DatabaseError(e.to_string())),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.db
            .insert(key, value.as_bytes())
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        self.flush_if_configured()?;

        tracing::trace!(key = %key, size_bytes = value.len(), "Value persisted");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.db
            .remove(key)
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        self.flush_if_configured()
    }

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        self.db
            .contains_key(key)
            .map_err(|e| StorageError::DatabaseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::stores::{BookCatalog, BookmarkStore, ReadingStatsTracker, SettingsStore};
    use crate::application::{KvStore, StorageKey, DEFAULT_NAMESPACE};
    use crate::config::SessionConfig;
    use crate::domain::book::{BookMetadata, ReadingLocation};
    use crate::domain::bookmark::BookmarkOptions;
    use crate::domain::settings::ReaderSettingsPatch;
    use crate::infrastructure::adapters::StaticMetadataResolver;
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::memory::ManualScheduler;
    use tempfile::tempdir;

    #[test]
    fn test_backend_put_get_remove() {
        let dir = tempdir().unwrap();
        let backend = SledKvBackend::open(dir.path().join("test.sled")).unwrap();

        backend.write("sumi:k", r#"{"a":1}"#).unwrap();
        assert_eq!(backend.read("sumi:k").unwrap().as_deref(), Some(r#"{"a":1}"#));
        assert!(backend.contains("sumi:k").unwrap());

        backend.delete("sumi:k").unwrap();
        assert_eq!(backend.read("sumi:k").unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.sled");
        {
            let backend = SledKvBackend::open(&path).unwrap();
            backend.write("sumi:readerSettings", r#"{"fontSize":20}"#).unwrap();
        }
        let backend = SledKvBackend::open(&path).unwrap();
        assert_eq!(
            backend.read("sumi:readerSettings").unwrap().as_deref(),
            Some(r#"{"fontSize":20}"#)
        );
    }

    #[tokio::test]
    async fn test_engine_state_survives_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.sled");
        let resolver = StaticMetadataResolver::new()
            .with_entry("/books/dune.epub", BookMetadata::new(Some("Dune"), Some("Frank Herbert")))
            .arc();
        let session_config = SessionConfig::default();

        let bookmark_id = {
            let store = KvStore::new(SledKvBackend::open(&path).unwrap().arc(), DEFAULT_NAMESPACE);
            let scheduler = ManualScheduler::new(1_000).arc();
            let events = EventPublisher::new().arc();

            let catalog = BookCatalog::new(store.clone(), scheduler.clone(), resolver.clone(), events.clone());
            catalog.open("/books/dune.epub").await;
            catalog.update_progress(
                "/books/dune.epub",
                ReadingLocation::new("epubcfi(/6/8)", 0.3).with_pages(120, 400),
            );

            let settings = SettingsStore::new(store.clone(), events.clone());
            settings.update_for_book("/books/dune.epub", ReaderSettingsPatch::font_size(22));

            let bookmarks = BookmarkStore::new(store.clone(), scheduler.clone(), events.clone());
            let bookmark = bookmarks.add(
                "/books/dune.epub",
                "epubcfi(/6/8)",
                BookmarkOptions::labeled("Arrakis"),
            );

            let tracker = ReadingStatsTracker::new(store, scheduler.clone(), session_config.clone(), events);
            tracker.start_session("/books/dune.epub");
            scheduler.advance_secs(42);
            tracker.end_session();

            bookmark.id
        };

        let store = KvStore::new(SledKvBackend::open(&path).unwrap().arc(), DEFAULT_NAMESPACE);
        assert!(store.has(StorageKey::RecentBooks));
        let scheduler = ManualScheduler::new(100_000).arc();
        let events = EventPublisher::new().arc();

        let catalog = BookCatalog::new(store.clone(), scheduler.clone(), resolver, events.clone());
        let book = catalog.get("/books/dune.epub").unwrap();
        assert_eq!(book.title(), "Dune");
        assert_eq!(book.author(), Some("Frank Herbert"));
        assert_eq!(book.progress(), 0.3);
        assert_eq!(book.total_pages(), Some(400));

        let settings = SettingsStore::new(store.clone(), events.clone());
        assert_eq!(settings.effective(Some("/books/dune.epub")).font_size, 22);

        let bookmarks = BookmarkStore::new(store.clone(), scheduler.clone(), events.clone());
        assert_eq!(bookmarks.get(&bookmark_id).unwrap().label.as_deref(), Some("Arrakis"));

        let tracker = ReadingStatsTracker::new(store, scheduler, session_config, events);
        let stats = tracker.stats_for("/books/dune.epub").unwrap();
        assert_eq!(stats.session_count, 1);
        assert!((stats.total_time - 42.0).abs() < 1e-9);
    }
}
