//! Sumi - 电子书阅读器本地状态与持久化引擎
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Book Context: 书籍、阅读位置、标题解析
//! - Settings Context: 排版设置与取值范围
//! - Bookmark Context: 书签
//! - Stats Context: 阅读统计与会话
//!
//! 应用层 (application/):
//! - Ports: 端口定义（KvBackend, Scheduler, MetadataResolver, FilePicker, Visibility）
//! - Storage: 命名空间 KV 存储
//! - Stores: SettingsStore, BookmarkStore, BookCatalog, ReadingStatsTracker
//!
//! 基础设施层 (infrastructure/):
//! - Persistence: Sled 存储
//! - Memory: 内存后端与虚拟时钟
//! - Runtime: Tokio 定时器与系统时钟
//! - Adapters: 元数据解析、文件选择
//! - Events: 状态变更广播、可见性信号

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
