//! Stats Context - 阅读会话
//!
//! 会话只存在于内存；累计时间越过最短阈值后才写入统计

use std::collections::BTreeMap;

use super::BookStatistics;

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
    Paused,
}

/// 当前阅读会话
///
/// `last_resume_time` 为 `None` 表示已暂停
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingSession {
    pub book_path: String,
    pub start_time: i64,
    pub accumulated_ms: i64,
    pub last_resume_time: Option<i64>,
    /// 本会话是否已计入 session_count
    pub counted: bool,
}

impl ReadingSession {
    pub fn start(book_path: impl Into<String>, now: i64) -> Self {
        Self {
            book_path: book_path.into(),
            start_time: now,
            accumulated_ms: 0,
            last_resume_time: Some(now),
            counted: false,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.last_resume_time.is_some() {
            SessionState::Active
        } else {
            SessionState::Paused
        }
    }

    pub fn is_paused(&self) -> bool {
        self.last_resume_time.is_none()
    }

    pub fn mark_paused(&mut self) {
        self.last_resume_time = None;
    }

    pub fn resume(&mut self, now: i64) {
        self.last_resume_time = Some(now);
    }

    /// 把上次恢复以来的时间并入 accumulated_ms，返回本次增量
    fn advance(&mut self, now: i64) -> i64 {
        let Some(resumed_at) = self.last_resume_time else {
            return 0;
        };
        let delta = (now - resumed_at).max(0);
        self.accumulated_ms += delta;
        self.last_resume_time = Some(now);
        delta
    }

    /// 刷新会话到统计
    ///
    /// 越过阈值的那一次写入全部累计时间，之后每次只写入增量；
    /// session_count 由会话自身的 counted 标记保证只加一次。
    /// 返回统计是否发生变化。
    ///
    /// 注意：越过阈值时不能只加本次增量。阈值之前的时间只存在于
    /// accumulated_ms 中，只加增量会丢掉它们：读 3s、隐藏 10s、再读 3s
    /// 应记 6s，只加增量则记 3s（见 test_time_before_crossing_is_not_lost）。
    pub fn flush_into(
        &mut self,
        stats: &mut BTreeMap<String, BookStatistics>,
        now: i64,
        min_session_ms: i64,
    ) -> bool {
        let delta = self.advance(now);

        if self.accumulated_ms < min_session_ms {
            return false;
        }

        let start_time = self.start_time;
        let entry = stats
            .entry(self.book_path.clone())
            .or_insert_with(|| BookStatistics::new(self.book_path.clone(), start_time, now));

        // 首次越过阈值: 全部累计时间；之后: 增量
        let contribution_ms = if self.counted {
            delta
        } else {
            entry.session_count += 1;
            self.counted = true;
            self.accumulated_ms
        };

        if contribution_ms > 0 {
            entry.total_time += contribution_ms as f64 / 1000.0;
        }
        entry.last_read = Some(now);
        true
    }
}
