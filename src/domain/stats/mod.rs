//! Stats Context - 阅读统计限界上下文
//!
//! 职责:
//! - 按书统计（总时长、会话数）
//! - 会话计时与阈值规则

mod entities;
mod session;

pub use entities::{format_duration, BookStatistics};
pub use session::{ReadingSession, SessionState};
