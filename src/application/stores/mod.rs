//! Stores - 状态引擎
//!
//! 每个引擎持有自己的内存状态，修改后立即通过 KvStore 持久化：
//! - SettingsStore: 全局设置与按书覆盖
//! - BookmarkStore: 按书书签
//! - BookCatalog: 书库、当前书与派生排序
//! - ReadingStatsTracker: 阅读会话状态机与统计

mod bookmark_store;
mod catalog;
mod settings_store;
mod stats_tracker;

pub use bookmark_store::BookmarkStore;
pub use catalog::BookCatalog;
pub use settings_store::SettingsStore;
pub use stats_tracker::ReadingStatsTracker;
