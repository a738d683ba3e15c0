//! Visibility Port - 窗口可见性信号

use std::sync::Arc;

/// 可见性变化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

/// 监听器 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

pub type VisibilityListener = Arc<dyn Fn(Visibility) + Send + Sync>;

/// Visibility Source Port
pub trait VisibilitySourcePort: Send + Sync {
    fn subscribe(&self, listener: VisibilityListener) -> ListenerId;

    fn unsubscribe(&self, id: ListenerId);
}
