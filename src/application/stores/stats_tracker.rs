//! Reading Session Tracker
//!
//! 状态机: Idle（无会话）/ Active（计时中）/ Paused（窗口隐藏）
//!
//! - 会话期间有一个固定间隔的自动保存定时器
//! - 切换书籍或结束会话时先取消旧定时器
//! - 定时器与可见性回调只持有 `Weak` 引用，跟踪器释放后回调自动失效

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use crate::application::ports::{
    ListenerId, SchedulerPort, TimerHandle, Visibility, VisibilitySourcePort,
};
use crate::application::storage::{KvStore, StorageKey};
use crate::config::SessionConfig;
use crate::domain::stats::{BookStatistics, ReadingSession, SessionState};
use crate::infrastructure::events::EventPublisher;

#[derive(Default)]
struct TrackerState {
    stats: BTreeMap<String, BookStatistics>,
    session: Option<ReadingSession>,
    timer: Option<TimerHandle>,
}

struct TrackerShared {
    store: KvStore,
    scheduler: Arc<dyn SchedulerPort>,
    config: SessionConfig,
    events: Arc<EventPublisher>,
    state: Mutex<TrackerState>,
    visibility: Mutex<Option<(Arc<dyn VisibilitySourcePort>, ListenerId)>>,
}

impl TrackerShared {
    fn now(&self) -> i64 {
        self.scheduler.now_ms()
    }

    /// 刷新当前会话并持久化，返回会话所属书籍
    fn flush_and_persist(&self, state: &mut TrackerState) -> Option<String> {
        let now = self.now();
        let session = state.session.as_mut()?;
        let changed = session.flush_into(&mut state.stats, now, self.config.min_session_ms);
        let book_path = session.book_path.clone();
        self.persist(state);
        changed.then_some(book_path)
    }

    fn persist(&self, state: &TrackerState) -> bool {
        self.store.set(StorageKey::ReadingStats, &state.stats)
    }

    /// 结束序列: 刷新、清除会话、取消定时器、持久化
    fn end_locked(&self, state: &mut TrackerState) -> Option<String> {
        let session = state.session.as_ref()?;
        let book_path = session.book_path.clone();

        let changed = self.flush_and_persist(state).is_some();
        let accumulated_ms = state.session.take().map(|s| s.accumulated_ms).unwrap_or(0);
        if let Some(timer) = state.timer.take() {
            self.scheduler.cancel(timer);
        }

        tracing::info!(
            book_path = %book_path,
            accumulated_ms,
            recorded = changed,
            "Reading session ended"
        );
        changed.then_some(book_path)
    }

    fn tick(&self) {
        let mut state = self.state.lock();
        if state.session.is_none() {
            return;
        }
        let changed = self.flush_and_persist(&mut state);
        drop(state);

        tracing::debug!("Reading session auto-saved");
        if let Some(book_path) = changed {
            self.events.publish_stats_changed(&book_path);
        }
    }

    fn handle_visibility(&self, visibility: Visibility) {
        let mut state = self.state.lock();
        let Some(session) = state.session.as_mut() else {
            return;
        };

        match visibility {
            Visibility::Hidden => {
                if session.is_paused() {
                    return;
                }
                let changed = self.flush_and_persist(&mut state);
                if let Some(session) = state.session.as_mut() {
                    session.mark_paused();
                }
                drop(state);

                tracing::debug!("Reading session paused");
                if let Some(book_path) = changed {
                    self.events.publish_stats_changed(&book_path);
                }
            }
            Visibility::Visible => {
                if session.is_paused() {
                    session.resume(self.now());
                    tracing::debug!(book_path = %session.book_path, "Reading session resumed");
                }
            }
        }
    }
}

/// 阅读统计跟踪器
pub struct ReadingStatsTracker {
    shared: Arc<TrackerShared>,
}

impl ReadingStatsTracker {
    pub fn new(
        store: KvStore,
        scheduler: Arc<dyn SchedulerPort>,
        config: SessionConfig,
        events: Arc<EventPublisher>,
    ) -> Self {
        let stats: BTreeMap<String, BookStatistics> =
            store.get(StorageKey::ReadingStats, BTreeMap::new());

        tracing::info!(
            books = stats.len(),
            auto_save_secs = config.auto_save_interval_secs,
            "ReadingStatsTracker loaded"
        );

        Self {
            shared: Arc::new(TrackerShared {
                store,
                scheduler,
                config,
                events,
                state: Mutex::new(TrackerState {
                    stats,
                    ..TrackerState::default()
                }),
                visibility: Mutex::new(None),
            }),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// 开始阅读某本书
    ///
    /// 同一本书暂停中则恢复，计时中则不做任何事；
    /// 换书时先完整结束旧会话。
    pub fn start_session(&self, book_path: &str) {
        let shared = &self.shared;
        let mut state = shared.state.lock();

        if let Some(session) = state.session.as_mut() {
            if session.book_path == book_path {
                if session.is_paused() {
                    session.resume(shared.now());
                    tracing::debug!(book_path = %book_path, "Reading session resumed");
                }
                return;
            }
        }

        let ended = shared.end_locked(&mut state);

        state.session = Some(ReadingSession::start(book_path, shared.now()));
        let weak: Weak<TrackerShared> = Arc::downgrade(shared);
        let timer = shared.scheduler.schedule_recurring(
            shared.config.auto_save_interval(),
            Arc::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.tick();
                }
            }),
        );
        state.timer = Some(timer);
        drop(state);

        tracing::info!(book_path = %book_path, "Reading session started");
        if let Some(previous) = ended {
            shared.events.publish_stats_changed(&previous);
        }
    }

    /// 结束当前会话，没有会话时不做任何事
    pub fn end_session(&self) {
        let mut state = self.shared.state.lock();
        let ended = self.shared.end_locked(&mut state);
        drop(state);

        if let Some(book_path) = ended {
            self.shared.events.publish_stats_changed(&book_path);
        }
    }

    /// 窗口隐藏: 刷新并暂停
    pub fn pause(&self) {
        self.shared.handle_visibility(Visibility::Hidden);
    }

    /// 窗口显示: 恢复计时，不刷新
    pub fn resume(&self) {
        self.shared.handle_visibility(Visibility::Visible);
    }

    pub fn handle_visibility(&self, visibility: Visibility) {
        self.shared.handle_visibility(visibility);
    }

    /// 订阅可见性信号，重复调用会先退订旧的来源
    pub fn attach_visibility(&self, source: Arc<dyn VisibilitySourcePort>) {
        self.detach_visibility();

        let weak = Arc::downgrade(&self.shared);
        let id = source.subscribe(Arc::new(move |visibility| {
            if let Some(shared) = weak.upgrade() {
                shared.handle_visibility(visibility);
            }
        }));
        *self.shared.visibility.lock() = Some((source, id));
    }

    fn detach_visibility(&self) {
        let attached = self.shared.visibility.lock().take();
        if let Some((source, id)) = attached {
            source.unsubscribe(id);
        }
    }

    /// 退订可见性信号并结束会话（关闭窗口、进程退出）
    pub fn cleanup(&self) {
        self.detach_visibility();
        self.end_session();
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.shared
            .state
            .lock()
            .session
            .as_ref()
            .map(ReadingSession::state)
            .unwrap_or(SessionState::Idle)
    }

    pub fn current_session(&self) -> Option<ReadingSession> {
        self.shared.state.lock().session.clone()
    }

    pub fn stats_for(&self, book_path: &str) -> Option<BookStatistics> {
        self.shared.state.lock().stats.get(book_path).cloned()
    }

    pub fn all_stats(&self) -> BTreeMap<String, BookStatistics> {
        self.shared.state.lock().stats.clone()
    }

    /// 累计阅读秒数，未知书籍为 0
    pub fn reading_time_for(&self, book_path: &str) -> f64 {
        self.shared
            .state
            .lock()
            .stats
            .get(book_path)
            .map(|s| s.total_time)
            .unwrap_or(0.0)
    }
}
