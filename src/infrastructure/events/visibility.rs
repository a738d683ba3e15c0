//! Visibility Publisher
//!
//! 宿主窗口的可见性事件分发，监听器在发布线程上同步调用

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::application::ports::{ListenerId, Visibility, VisibilityListener, VisibilitySourcePort};

pub struct VisibilityPublisher {
    listeners: Mutex<Vec<(ListenerId, VisibilityListener)>>,
    next_id: AtomicU64,
}

impl VisibilityPublisher {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 通知所有监听器
    pub fn publish(&self, visibility: Visibility) {
        // 先复制列表再回调，监听器内可以安全地订阅或退订
        let listeners: Vec<VisibilityListener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        tracing::debug!(?visibility, listeners = listeners.len(), "Visibility changed");
        for listener in listeners {
            listener(visibility);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl Default for VisibilityPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilitySourcePort for VisibilityPublisher {
    fn subscribe(&self, listener: VisibilityListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.lock().retain(|(existing, _)| *existing != id);
    }
}
