//! Clock & Scheduler Ports - 时钟与定时器抽象
//!
//! 会话跟踪器依赖这里的抽象，因此可以在虚拟时钟上测试

use std::sync::Arc;
use std::time::Duration;

/// 定时器句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// 定时回调
pub type TimerCallback = Arc<dyn Fn() + Send + Sync>;

/// Clock Port
pub trait ClockPort: Send + Sync {
    /// 当前时间（Unix 毫秒）
    fn now_ms(&self) -> i64;
}

/// Scheduler Port
///
/// 周期性调度；取消后的定时器不再触发
pub trait SchedulerPort: ClockPort {
    /// 按固定间隔重复执行回调（首次触发在一个间隔之后）
    fn schedule_recurring(&self, interval: Duration, callback: TimerCallback) -> TimerHandle;

    /// 取消定时器，重复取消无副作用
    fn cancel(&self, handle: TimerHandle);
}
