//! Persistent KV Store - 命名空间键值存储
//!
//! 所有引擎都建立在这一层之上：
//! - 值以 JSON 序列化，缺失的可选字段省略而不是写成 null
//! - `get` 从不向调用方报错，缺失、后端不可用、数据损坏都返回默认值并记录警告
//! - `set` / `remove` 只返回是否成功，调用方视持久化为尽力而为

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::application::ports::KvBackendPort;

/// 默认命名空间前缀
pub const DEFAULT_NAMESPACE: &str = "sumi:";

/// 持久化布局中的键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    RecentBooks,
    ReaderSettings,
    BookSpecificSettings,
    Bookmarks,
    ReadingStats,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::RecentBooks => "recentBooks",
            StorageKey::ReaderSettings => "readerSettings",
            StorageKey::BookSpecificSettings => "bookSpecificSettings",
            StorageKey::Bookmarks => "bookmarks",
            StorageKey::ReadingStats => "readingStats",
        }
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// 命名空间 KV 存储
#[derive(Clone)]
pub struct KvStore {
    backend: Arc<dyn KvBackendPort>,
    namespace: String,
}

impl KvStore {
    pub fn new(backend: Arc<dyn KvBackendPort>, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    /// 读取并反序列化，任何失败都返回 `default`
    pub fn get<T: DeserializeOwned>(&self, key: impl AsRef<str>, default: T) -> T {
        let key = key.as_ref();
        let raw = match self.backend.read(&self.namespaced(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Error reading from storage");
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Malformed payload in storage");
                default
            }
        }
    }

    /// 序列化并写入，返回是否成功
    pub fn set<T: Serialize + ?Sized>(&self, key: impl AsRef<str>, value: &T) -> bool {
        let key = key.as_ref();
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to serialize value for storage");
                return false;
            }
        };

        match self.backend.write(&self.namespaced(key), &payload) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Error writing to storage");
                false
            }
        }
    }

    pub fn remove(&self, key: impl AsRef<str>) -> bool {
        let key = key.as_ref();
        match self.backend.delete(&self.namespaced(key)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Error removing from storage");
                false
            }
        }
    }

    pub fn has(&self, key: impl AsRef<str>) -> bool {
        let key = key.as_ref();
        match self.backend.contains(&self.namespaced(key)) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Error checking storage");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryKvBackend;
    use std::collections::BTreeMap;

    fn store() -> (Arc<InMemoryKvBackend>, KvStore) {
        let backend = Arc::new(InMemoryKvBackend::new());
        let store = KvStore::new(backend.clone(), DEFAULT_NAMESPACE);
        (backend, store)
    }

    #[test]
    fn test_keys_are_namespaced() {
        let (backend, store) = store();
        assert!(store.set(StorageKey::Bookmarks, &BTreeMap::<String, u32>::new()));
        assert_eq!(backend.raw("sumi:bookmarks").as_deref(), Some("{}"));
        assert!(store.has(StorageKey::Bookmarks));
        assert!(!store.has(StorageKey::ReadingStats));
    }

    #[test]
    fn test_missing_key_yields_default() {
        let (_, store) = store();
        let value: Vec<String> = store.get("recentBooks", vec!["fallback".to_string()]);
        assert_eq!(value, vec!["fallback".to_string()]);
    }

    #[test]
    fn test_malformed_payload_yields_default() {
        let (backend, store) = store();
        backend.insert_raw("sumi:readingStats", "{not json");
        let value: BTreeMap<String, f64> = store.get(StorageKey::ReadingStats, BTreeMap::new());
        assert!(value.is_empty());
    }

    #[test]
    fn test_unavailable_backend_degrades() {
        let (backend, store) = store();
        assert!(store.set("k", &1u32));
        backend.set_available(false);

        assert!(!store.set("k", &2u32));
        assert!(!store.remove("k"));
        assert!(!store.has("k"));
        assert_eq!(store.get("k", 0u32), 0);

        backend.set_available(true);
        assert_eq!(store.get("k", 0u32), 1);
    }

    #[test]
    fn test_remove() {
        let (_, store) = store();
        store.set("k", "v");
        assert!(store.remove("k"));
        assert!(!store.has("k"));
        assert!(store.remove("k"));
    }
}
