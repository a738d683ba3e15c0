//! In-Memory KV Backend Implementation
//!
//! 不落盘的后端，用于测试和临时会话；可以模拟后端不可用

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::application::ports::{KvBackendPort, StorageError};

/// 内存键值后端
pub struct InMemoryKvBackend {
    entries: Mutex<HashMap<String, String>>,
    available: AtomicBool,
}

impl InMemoryKvBackend {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 切换可用状态，不可用时所有操作都返回错误
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// 直接读取原始值（绕过可用性检查）
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    /// 直接写入原始值（绕过可用性检查）
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }

    fn ensure_available(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable("in-memory backend disabled".to_string()))
        }
    }
}

impl Default for InMemoryKvBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl KvBackendPort for InMemoryKvBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.ensure_available()?;
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.ensure_available()?;
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.ensure_available()?;
        self.entries.lock().remove(key);
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        self.ensure_available()?;
        Ok(self.entries.lock().contains_key(key))
    }
}
