//! Event Publisher Implementation
//!
//! 状态变更通知：每次成功修改后广播一个事件，UI 层按需订阅

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// 状态变更事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum StateEvent {
    /// 书目列表变更
    CatalogChanged,
    /// 当前书变更
    ActiveBookChanged {
        #[serde(skip_serializing_if = "Option::is_none")]
        book_path: Option<String>,
    },
    /// 设置变更（`None` 表示全局层）
    SettingsChanged {
        #[serde(skip_serializing_if = "Option::is_none")]
        book_path: Option<String>,
    },
    /// 书签变更
    BookmarksChanged { book_path: String },
    /// 阅读统计变更
    StatsChanged { book_path: String },
}

/// 事件发布器
pub struct EventPublisher {
    channel: broadcast::Sender<StateEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(100);
        Self { channel: tx }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.channel.subscribe()
    }

    pub fn publish_catalog_changed(&self) {
        self.publish(StateEvent::CatalogChanged);
    }

    pub fn publish_active_book_changed(&self, book_path: Option<&str>) {
        self.publish(StateEvent::ActiveBookChanged {
            book_path: book_path.map(str::to_string),
        });
    }

    pub fn publish_settings_changed(&self, book_path: Option<&str>) {
        self.publish(StateEvent::SettingsChanged {
            book_path: book_path.map(str::to_string),
        });
    }

    pub fn publish_bookmarks_changed(&self, book_path: &str) {
        self.publish(StateEvent::BookmarksChanged {
            book_path: book_path.to_string(),
        });
    }

    pub fn publish_stats_changed(&self, book_path: &str) {
        self.publish(StateEvent::StatsChanged {
            book_path: book_path.to_string(),
        });
    }

    fn publish(&self, event: StateEvent) {
        if let Err(e) = self.channel.send(event) {
            tracing::trace!(error = %e, "Failed to publish state event (no receivers)");
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
