//! Tokio Scheduler - 基于 tokio 定时器的调度器实现

use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Handle, TryCurrentError};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{ClockPort, SchedulerPort, TimerCallback, TimerHandle};

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Tokio 调度器
///
/// 每个定时器是一个独立的 tokio 任务，通过 CancellationToken 停止
pub struct TokioScheduler {
    runtime: Handle,
    next_handle: AtomicU64,
    timers: Mutex<HashMap<TimerHandle, CancellationToken>>,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            next_handle: AtomicU64::new(1),
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// 使用当前所在的 tokio 运行时
    pub fn try_current() -> Result<Self, TryCurrentError> {
        Handle::try_current().map(Self::new)
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn active_timers(&self) -> usize {
        self.timers.lock().len()
    }
}

impl ClockPort for TokioScheduler {
    fn now_ms(&self) -> i64 {
        SystemClock.now_ms()
    }
}

impl SchedulerPort for TokioScheduler {
    fn schedule_recurring(&self, interval: Duration, callback: TimerCallback) -> TimerHandle {
        let handle = TimerHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let token = CancellationToken::new();
        let cancelled = token.clone();

        self.runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        // 回调会同步写盘（sled flush），放到阻塞线程池执行；
                        // 等待其完成后再进入下一轮，同一定时器的回调不会重叠
                        let callback = callback.clone();
                        if let Err(e) = tokio::task::spawn_blocking(move || callback()).await {
                            tracing::warn!(timer = handle.0, error = %e, "Timer callback failed");
                        }
                    }
                }
            }
            tracing::trace!(timer = handle.0, "Recurring timer stopped");
        });

        self.timers.lock().insert(handle, token);
        tracing::debug!(timer = handle.0, interval_ms = interval.as_millis() as u64, "Recurring timer scheduled");
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(token) = self.timers.lock().remove(&handle) {
            token.cancel();
        }
    }
}
