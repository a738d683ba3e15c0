//! Events - 事件分发
//!
//! - 状态变更广播（给 UI 层）
//! - 窗口可见性信号（给会话跟踪器）

mod publisher;
mod visibility;

pub use publisher::{EventPublisher, StateEvent};
pub use visibility::VisibilityPublisher;
