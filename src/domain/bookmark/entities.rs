//! Bookmark Context - Entities

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 书签唯一标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkId(String);

impl BookmarkId {
    /// 生成新的随机 ID（v4 UUID，操作系统随机源）
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BookmarkId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 创建书签时的可选信息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookmarkOptions {
    pub label: Option<String>,
    pub note: Option<String>,
    pub display_page: Option<u32>,
    pub display_section: Option<String>,
}

impl BookmarkOptions {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }
}

/// 书签可编辑字段，只合并提供的字段
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookmarkUpdate {
    pub label: Option<String>,
    pub note: Option<String>,
}

/// 书签
///
/// location 按字符串完全相等比较
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: BookmarkId,
    pub book_path: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_section: Option<String>,
}

impl Bookmark {
    pub fn new(
        book_path: impl Into<String>,
        location: impl Into<String>,
        options: BookmarkOptions,
        now: i64,
    ) -> Self {
        Self {
            id: BookmarkId::generate(),
            book_path: book_path.into(),
            location: location.into(),
            label: options.label,
            note: options.note,
            created_at: now,
            display_page: options.display_page,
            display_section: options.display_section,
        }
    }

    pub fn apply(&mut self, update: BookmarkUpdate) {
        if let Some(label) = update.label {
            self.label = Some(label);
        }
        if let Some(note) = update.note {
            self.note = Some(note);
        }
    }

    pub fn is_at(&self, location: &str) -> bool {
        self.location == location
    }
}
