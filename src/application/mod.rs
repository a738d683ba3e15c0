//! 应用层 - 状态引擎
//!
//! 包含：
//! - ports: 六边形架构端口定义（KV 后端、时钟与调度、元数据、文件选择、可见性）
//! - storage: 命名空间 KV 存储
//! - stores: 设置、书签、书库、阅读统计四个引擎

pub mod ports;
pub mod storage;
pub mod stores;

pub use storage::{KvStore, StorageKey, DEFAULT_NAMESPACE};
pub use stores::{BookCatalog, BookmarkStore, ReadingStatsTracker, SettingsStore};
