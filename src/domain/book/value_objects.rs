//! Book Context - Value Objects

use serde::{Deserialize, Serialize};

/// 阅读位置
///
/// 由渲染引擎产生，更新时整体替换，不做逐字段合并
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingLocation {
    /// 位置令牌（格式相关，对本层不透明）
    #[serde(rename = "cfi", default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    /// 阅读进度 [0, 1]
    pub fraction: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ReadingLocation {
    pub fn new(position: impl Into<String>, fraction: f64) -> Self {
        Self {
            position: Some(position.into()),
            page: None,
            total_pages: None,
            fraction,
            label: None,
        }
    }

    pub fn with_pages(mut self, page: u32, total_pages: u32) -> Self {
        self.page = Some(page);
        self.total_pages = Some(total_pages);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// 外部元数据解析结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
}

impl BookMetadata {
    pub fn new(title: Option<&str>, author: Option<&str>) -> Self {
        Self {
            title: title.map(str::to_string),
            author: author.map(str::to_string),
        }
    }
}

/// 阅读进度快照
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingProgress {
    pub location: Option<ReadingLocation>,
    pub progress: f64,
    pub total_pages: Option<u32>,
}
