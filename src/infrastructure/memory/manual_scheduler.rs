//! Manual Scheduler - 虚拟时钟调度器
//!
//! 时间只在调用 `advance` 时前进，到期的定时器按触发时间顺序同步执行

use parking_lot::Mutex;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{ClockPort, SchedulerPort, TimerCallback, TimerHandle};

struct ManualTimer {
    handle: TimerHandle,
    interval_ms: i64,
    next_fire: i64,
    callback: TimerCallback,
}

/// 手动推进的调度器
pub struct ManualScheduler {
    now: AtomicI64,
    next_handle: AtomicU64,
    timers: Mutex<Vec<ManualTimer>>,
}

impl ManualScheduler {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
            next_handle: AtomicU64::new(1),
            timers: Mutex::new(Vec::new()),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 推进时钟并触发期间到期的定时器
    pub fn advance(&self, duration: Duration) {
        let target = self.now.load(Ordering::SeqCst) + duration.as_millis() as i64;

        loop {
            // 锁只在挑选定时器时持有，回调里可以再调度或取消
            let due = {
                let mut timers = self.timers.lock();
                timers
                    .iter_mut()
                    .filter(|t| t.next_fire <= target)
                    .min_by_key(|t| t.next_fire)
                    .map(|timer| {
                        let fire_at = timer.next_fire;
                        timer.next_fire += timer.interval_ms;
                        (fire_at, timer.callback.clone())
                    })
            };

            let Some((fire_at, callback)) = due else {
                break;
            };
            self.now.store(fire_at, Ordering::SeqCst);
            callback();
        }

        self.now.store(target, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    pub fn active_timers(&self) -> usize {
        self.timers.lock().len()
    }
}

impl ClockPort for ManualScheduler {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl SchedulerPort for ManualScheduler {
    fn schedule_recurring(&self, interval: Duration, callback: TimerCallback) -> TimerHandle {
        let handle = TimerHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let interval_ms = (interval.as_millis() as i64).max(1);
        self.timers.lock().push(ManualTimer {
            handle,
            interval_ms,
            next_fire: self.now_ms() + interval_ms,
            callback,
        });
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        self.timers.lock().retain(|t| t.handle != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_recurring_timer_fires_per_interval() {
        let scheduler = ManualScheduler::new(0);
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        scheduler.schedule_recurring(
            Duration::from_secs(30),
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        scheduler.advance_secs(29);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        scheduler.advance_secs(1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        scheduler.advance_secs(65);
        assert_eq!(fired.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.now_ms(), 95_000);
    }

    #[test]
    fn test_clock_reads_fire_time_inside_callback() {
        let scheduler = ManualScheduler::new(1_000).arc();
        let seen = Arc::new(AtomicI64::new(0));
        let (clock, slot) = (scheduler.clone(), seen.clone());
        scheduler.schedule_recurring(
            Duration::from_secs(10),
            Arc::new(move || slot.store(clock.now_ms(), Ordering::SeqCst)),
        );

        scheduler.advance_secs(15);
        assert_eq!(seen.load(Ordering::SeqCst), 11_000);
    }

    #[test]
    fn test_cancelled_timer_does_not_fire() {
        let scheduler = ManualScheduler::new(0);
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let handle = scheduler.schedule_recurring(
            Duration::from_secs(1),
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        scheduler.cancel(handle);
        scheduler.advance_secs(10);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.active_timers(), 0);
    }
}
