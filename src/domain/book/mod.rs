//! Book Context - 书目限界上下文
//!
//! 职责:
//! - Book 聚合（阅读进度、累计时间）
//! - 阅读位置值对象
//! - 首次打开时的标题解析

mod aggregate;
mod title;
mod value_objects;

pub use aggregate::Book;
pub use title::{file_stem, resolve_identity, sanitize_stem, ResolvedIdentity};
pub use value_objects::{BookMetadata, ReadingLocation, ReadingProgress};
