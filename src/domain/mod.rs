//! Domain Layer - 领域层
//!
//! 包含四个限界上下文:
//! - Book Context: 书目与阅读进度
//! - Settings Context: 排版设置
//! - Bookmark Context: 书签
//! - Stats Context: 阅读统计与会话

pub mod book;
pub mod bookmark;
pub mod settings;
pub mod stats;
