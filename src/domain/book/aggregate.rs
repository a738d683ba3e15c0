//! Book Context - Aggregate Root

use serde::{Deserialize, Serialize};

use super::{ReadingLocation, ReadingProgress};

/// Book 聚合根
///
/// 不变量:
/// - 以 path 唯一标识
/// - 存储顺序没有语义，所有排序都在读取时派生
/// - progress 始终来自最近一次 location 的 fraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    path: String,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    added_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_read_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<ReadingLocation>,
    #[serde(default)]
    progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_pages: Option<u32>,
    /// 累计阅读时间（秒）
    #[serde(default)]
    reading_time: f64,
}

impl Book {
    /// 首次打开时创建
    pub fn new(path: impl Into<String>, title: String, author: Option<String>, now: i64) -> Self {
        Self {
            path: path.into(),
            title,
            author,
            added_at: now,
            last_read_at: Some(now),
            location: None,
            progress: 0.0,
            total_pages: None,
            reading_time: 0.0,
        }
    }

    /// 再次打开
    pub fn touch(&mut self, now: i64) {
        self.last_read_at = Some(now);
    }

    /// 整体替换阅读位置
    pub fn apply_location(&mut self, location: ReadingLocation, now: i64) {
        self.progress = location.fraction;
        self.total_pages = location.total_pages;
        self.location = Some(location);
        self.last_read_at = Some(now);
    }

    /// 清除位置与进度，保留总页数
    pub fn clear_progress(&mut self) {
        self.location = None;
        self.progress = 0.0;
    }

    pub fn add_reading_time(&mut self, seconds: f64) {
        self.reading_time += seconds;
    }

    /// 进行中: 0 < progress < 1
    pub fn is_in_progress(&self) -> bool {
        self.progress > 0.0 && self.progress < 1.0
    }

    /// 排序用的最近阅读时间，缺失时视为 0
    pub fn recency_key(&self) -> i64 {
        self.last_read_at.unwrap_or(0)
    }

    pub fn progress_snapshot(&self) -> ReadingProgress {
        ReadingProgress {
            location: self.location.clone(),
            progress: self.progress,
            total_pages: self.total_pages,
        }
    }

    // Getters
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn added_at(&self) -> i64 {
        self.added_at
    }

    pub fn last_read_at(&self) -> Option<i64> {
        self.last_read_at
    }

    pub fn location(&self) -> Option<&ReadingLocation> {
        self.location.as_ref()
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn reading_time(&self) -> f64 {
        self.reading_time
    }
}
