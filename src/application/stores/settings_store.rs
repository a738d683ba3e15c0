//! Settings Cascade Engine
//!
//! 有效设置 = 全局设置 + 按书覆盖（覆盖层中存在的字段优先）。
//! 所有写入入口都会钳制数值字段；读取路径不重新钳制已存储的数据。

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::storage::{KvStore, StorageKey};
use crate::domain::settings::{
    bounds, global_from_stored, ReaderSettings, ReaderSettingsPatch, DEFAULT_FONT_SIZE,
};
use crate::infrastructure::events::EventPublisher;

struct SettingsState {
    global: ReaderSettings,
    books: BTreeMap<String, ReaderSettingsPatch>,
    active_book: Option<String>,
}

impl SettingsState {
    fn effective(&self, book_path: Option<&str>) -> ReaderSettings {
        match book_path.and_then(|path| self.books.get(path)) {
            Some(overrides) => self.global.merged(overrides),
            None => self.global.clone(),
        }
    }

    fn apply_global(&mut self, patch: &ReaderSettingsPatch) -> ReaderSettings {
        self.global = self.global.merged(patch).validated();
        self.global.clone()
    }

    /// 合并到该书覆盖层，返回该书的有效设置
    fn apply_book(&mut self, book_path: &str, patch: &ReaderSettingsPatch) -> ReaderSettings {
        let current = self.books.get(book_path).cloned().unwrap_or_default();
        self.books
            .insert(book_path.to_string(), current.overlay(patch).validated());
        self.effective(Some(book_path))
    }
}

/// 设置存储
pub struct SettingsStore {
    store: KvStore,
    events: Arc<EventPublisher>,
    state: Mutex<SettingsState>,
}

impl SettingsStore {
    pub fn new(store: KvStore, events: Arc<EventPublisher>) -> Self {
        let stored_global: ReaderSettingsPatch =
            store.get(StorageKey::ReaderSettings, ReaderSettingsPatch::default());
        let books: BTreeMap<String, ReaderSettingsPatch> =
            store.get(StorageKey::BookSpecificSettings, BTreeMap::new());

        tracing::info!(book_overrides = books.len(), "SettingsStore loaded");

        Self {
            store,
            events,
            state: Mutex::new(SettingsState {
                global: global_from_stored(&stored_global),
                books,
                active_book: None,
            }),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn global(&self) -> ReaderSettings {
        self.state.lock().global.clone()
    }

    /// 某本书的覆盖层
    pub fn book_settings(&self, book_path: &str) -> Option<ReaderSettingsPatch> {
        self.state.lock().books.get(book_path).cloned()
    }

    pub fn has_book_settings(&self, book_path: &str) -> bool {
        self.state.lock().books.contains_key(book_path)
    }

    /// 有效设置，`None` 时只返回全局设置
    pub fn effective(&self, book_path: Option<&str>) -> ReaderSettings {
        self.state.lock().effective(book_path)
    }

    /// 当前书的有效设置
    pub fn active_settings(&self) -> ReaderSettings {
        let state = self.state.lock();
        state.effective(state.active_book.as_deref())
    }

    pub fn active_book(&self) -> Option<String> {
        self.state.lock().active_book.clone()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub fn set_active_book(&self, book_path: Option<&str>) {
        self.state.lock().active_book = book_path.map(str::to_string);
    }

    /// 更新全局设置
    pub fn update_global(&self, patch: ReaderSettingsPatch) -> ReaderSettings {
        let mut state = self.state.lock();
        let updated = state.apply_global(&patch);
        self.persist_global(&state);
        drop(state);

        tracing::debug!(font_size = updated.font_size, "Global settings updated");
        self.events.publish_settings_changed(None);
        updated
    }

    /// 更新某本书的覆盖层
    pub fn update_for_book(&self, book_path: &str, patch: ReaderSettingsPatch) -> ReaderSettings {
        let mut state = self.state.lock();
        let effective = state.apply_book(book_path, &patch);
        self.persist_books(&state);
        drop(state);

        tracing::debug!(book_path = %book_path, font_size = effective.font_size, "Book settings updated");
        self.events.publish_settings_changed(Some(book_path));
        effective
    }

    /// 删除覆盖层，该书完全回到全局设置
    pub fn clear_book_settings(&self, book_path: &str) -> bool {
        let mut state = self.state.lock();
        if state.books.remove(book_path).is_none() {
            return false;
        }
        self.persist_books(&state);
        drop(state);

        tracing::debug!(book_path = %book_path, "Book settings cleared");
        self.events.publish_settings_changed(Some(book_path));
        true
    }

    pub fn increase_font_size(&self) -> ReaderSettings {
        self.step_font_size(1)
    }

    pub fn decrease_font_size(&self) -> ReaderSettings {
        self.step_font_size(-1)
    }

    /// 当前层的字号恢复为默认值（不是全局当前值）
    pub fn reset_font_size(&self) -> ReaderSettings {
        self.write_active_layer(|_| DEFAULT_FONT_SIZE)
    }

    pub fn reset_global(&self) {
        let mut state = self.state.lock();
        state.global = ReaderSettings::default();
        self.persist_global(&state);
        drop(state);

        tracing::info!("Global settings reset to defaults");
        self.events.publish_settings_changed(None);
    }

    /// 全局设置恢复默认并删除所有覆盖层
    pub fn reset_all(&self) {
        let mut state = self.state.lock();
        state.global = ReaderSettings::default();
        state.books.clear();
        self.persist_global(&state);
        self.persist_books(&state);
        drop(state);

        tracing::info!("All settings reset to defaults");
        self.events.publish_settings_changed(None);
    }

    /// 从当前有效字号出发按步长调整，写入当前层
    fn step_font_size(&self, steps: i32) -> ReaderSettings {
        self.write_active_layer(|current| bounds::step_font_size(current, steps))
    }

    /// 写入当前层的字号：有当前书时为该书覆盖层，否则为全局
    ///
    /// 读取当前层、计算新字号与写入在同一把锁内完成
    fn write_active_layer(&self, font_size: impl FnOnce(i32) -> i32) -> ReaderSettings {
        let mut state = self.state.lock();
        let active_book = state.active_book.clone();
        let current = state.effective(active_book.as_deref()).font_size;
        let patch = ReaderSettingsPatch::font_size(font_size(current));

        let effective = match active_book.as_deref() {
            Some(book_path) => {
                let effective = state.apply_book(book_path, &patch);
                self.persist_books(&state);
                effective
            }
            None => {
                let effective = state.apply_global(&patch);
                self.persist_global(&state);
                effective
            }
        };
        drop(state);

        tracing::debug!(
            book_path = active_book.as_deref().unwrap_or("-"),
            font_size = effective.font_size,
            "Font size updated"
        );
        self.events.publish_settings_changed(active_book.as_deref());
        effective
    }

    fn persist_global(&self, state: &SettingsState) -> bool {
        self.store.set(StorageKey::ReaderSettings, &state.global)
    }

    fn persist_books(&self, state: &SettingsState) -> bool {
        self.store.set(StorageKey::BookSpecificSettings, &state.books)
    }
}
