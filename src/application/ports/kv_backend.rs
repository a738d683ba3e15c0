//! KV Backend Port - 持久化键值后端
//!
//! 以字符串为键、字符串为值的持久化存储抽象，
//! 具体实现在 infrastructure 层（Sled / 内存）

use thiserror::Error;

/// 存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// KV Backend Port
///
/// 键已经带有命名空间前缀，后端不做任何解释
pub trait KvBackendPort: Send + Sync {
    /// 读取原始值，键不存在时返回 `Ok(None)`
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// 写入原始值（覆盖）
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// 删除键，键不存在不是错误
    fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// 检查键是否存在
    fn contains(&self, key: &str) -> Result<bool, StorageError>;
}
