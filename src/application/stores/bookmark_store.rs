//! Bookmark Registry
//!
//! 每本书一个按插入顺序排列的书签序列；
//! 序列为空时整个条目被删除，存储中不会出现空数组。

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::ports::ClockPort;
use crate::application::storage::{KvStore, StorageKey};
use crate::domain::bookmark::{Bookmark, BookmarkId, BookmarkOptions, BookmarkUpdate};
use crate::infrastructure::events::EventPublisher;

#[derive(Default)]
struct BookmarkState {
    by_book: BTreeMap<String, Vec<Bookmark>>,
    active_book: Option<String>,
}

impl BookmarkState {
    fn find(&self, id: &BookmarkId) -> Option<&Bookmark> {
        self.by_book.values().flatten().find(|b| &b.id == id)
    }

    fn find_at(&self, book_path: &str, location: &str) -> Option<&Bookmark> {
        self.by_book
            .get(book_path)?
            .iter()
            .find(|b| b.is_at(location))
    }

    /// 删除书签，返回其所属书籍
    fn remove(&mut self, id: &BookmarkId) -> Option<String> {
        let book_path = self
            .by_book
            .iter()
            .find(|(_, list)| list.iter().any(|b| &b.id == id))
            .map(|(path, _)| path.clone())?;

        if let Some(list) = self.by_book.get_mut(&book_path) {
            list.retain(|b| &b.id != id);
            if list.is_empty() {
                self.by_book.remove(&book_path);
            }
        }
        Some(book_path)
    }
}

/// 书签存储
pub struct BookmarkStore {
    store: KvStore,
    clock: Arc<dyn ClockPort>,
    events: Arc<EventPublisher>,
    state: Mutex<BookmarkState>,
}

impl BookmarkStore {
    pub fn new(store: KvStore, clock: Arc<dyn ClockPort>, events: Arc<EventPublisher>) -> Self {
        let mut by_book: BTreeMap<String, Vec<Bookmark>> =
            store.get(StorageKey::Bookmarks, BTreeMap::new());
        by_book.retain(|_, list| !list.is_empty());

        tracing::info!(
            books = by_book.len(),
            bookmarks = by_book.values().map(Vec::len).sum::<usize>(),
            "BookmarkStore loaded"
        );

        Self {
            store,
            clock,
            events,
            state: Mutex::new(BookmarkState {
                by_book,
                active_book: None,
            }),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 追加书签（不检查同位置是否已有书签）
    pub fn add(&self, book_path: &str, location: &str, options: BookmarkOptions) -> Bookmark {
        let bookmark = Bookmark::new(book_path, location, options, self.clock.now_ms());

        let mut state = self.state.lock();
        state
            .by_book
            .entry(book_path.to_string())
            .or_default()
            .push(bookmark.clone());
        self.persist(&state);
        drop(state);

        tracing::debug!(book_path = %book_path, bookmark_id = %bookmark.id, "Bookmark added");
        self.events.publish_bookmarks_changed(book_path);
        bookmark
    }

    /// 按 ID 删除，只有真正删除时才持久化
    pub fn remove(&self, id: &BookmarkId) -> bool {
        let mut state = self.state.lock();
        let Some(book_path) = state.remove(id) else {
            return false;
        };
        self.persist(&state);
        drop(state);

        tracing::debug!(book_path = %book_path, bookmark_id = %id, "Bookmark removed");
        self.events.publish_bookmarks_changed(&book_path);
        true
    }

    /// 只合并提供的字段
    pub fn update(&self, id: &BookmarkId, update: BookmarkUpdate) -> Option<Bookmark> {
        let mut state = self.state.lock();
        let bookmark = state
            .by_book
            .values_mut()
            .flatten()
            .find(|b| &b.id == id)?;
        bookmark.apply(update);
        let updated = bookmark.clone();
        self.persist(&state);
        drop(state);

        self.events.publish_bookmarks_changed(&updated.book_path);
        Some(updated)
    }

    /// 同位置已有书签则删除并返回 `None`，否则新建
    pub fn toggle(
        &self,
        book_path: &str,
        location: &str,
        options: BookmarkOptions,
    ) -> Option<Bookmark> {
        let now = self.clock.now_ms();

        // 查找、增删与持久化在同一把锁内完成
        let mut state = self.state.lock();
        let existing = state.find_at(book_path, location).map(|b| b.id.clone());
        let created = match existing {
            Some(id) => {
                state.remove(&id);
                tracing::debug!(book_path = %book_path, bookmark_id = %id, "Bookmark toggled off");
                None
            }
            None => {
                let bookmark = Bookmark::new(book_path, location, options, now);
                state
                    .by_book
                    .entry(book_path.to_string())
                    .or_default()
                    .push(bookmark.clone());
                tracing::debug!(book_path = %book_path, bookmark_id = %bookmark.id, "Bookmark toggled on");
                Some(bookmark)
            }
        };
        self.persist(&state);
        drop(state);

        self.events.publish_bookmarks_changed(book_path);
        created
    }

    /// 删除某本书的全部书签，返回删除数量
    pub fn clear_all_for_book(&self, book_path: &str) -> usize {
        let mut state = self.state.lock();
        let Some(removed) = state.by_book.remove(book_path) else {
            return 0;
        };
        self.persist(&state);
        drop(state);

        tracing::debug!(book_path = %book_path, count = removed.len(), "Bookmarks cleared");
        self.events.publish_bookmarks_changed(book_path);
        removed.len()
    }

    pub fn list_for_book(&self, book_path: &str) -> Vec<Bookmark> {
        self.state
            .lock()
            .by_book
            .get(book_path)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get(&self, id: &BookmarkId) -> Option<Bookmark> {
        self.state.lock().find(id).cloned()
    }

    pub fn exists_at(&self, book_path: &str, location: &str) -> bool {
        self.state.lock().find_at(book_path, location).is_some()
    }

    pub fn get_at(&self, book_path: &str, location: &str) -> Option<Bookmark> {
        self.state.lock().find_at(book_path, location).cloned()
    }

    pub fn total_count(&self) -> usize {
        self.state.lock().by_book.values().map(Vec::len).sum()
    }

    /// 当前书指针只影响派生视图，不持久化
    pub fn set_active_book(&self, book_path: Option<&str>) {
        self.state.lock().active_book = book_path.map(str::to_string);
    }

    pub fn active_book_bookmarks(&self) -> Vec<Bookmark> {
        let state = self.state.lock();
        state
            .active_book
            .as_deref()
            .and_then(|path| state.by_book.get(path))
            .cloned()
            .unwrap_or_default()
    }

    fn persist(&self, state: &BookmarkState) -> bool {
        self.store.set(StorageKey::Bookmarks, &state.by_book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::storage::DEFAULT_NAMESPACE;
    use crate::infrastructure::memory::{InMemoryKvBackend, ManualScheduler};

    fn setup() -> (Arc<InMemoryKvBackend>, KvStore, BookmarkStore) {
        let backend = InMemoryKvBackend::new().arc();
        let store = KvStore::new(backend.clone(), DEFAULT_NAMESPACE);
        let bookmarks = BookmarkStore::new(
            store.clone(),
            ManualScheduler::new(1_000).arc(),
            EventPublisher::new().arc(),
        );
        (backend, store, bookmarks)
    }

    #[test]
    fn test_add_keeps_insertion_order_and_allows_duplicates() {
        let (_, _, bookmarks) = setup();
        let first = bookmarks.add("/a.epub", "loc-2", BookmarkOptions::labeled("second"));
        let second = bookmarks.add("/a.epub", "loc-1", BookmarkOptions::default());
        let third = bookmarks.add("/a.epub", "loc-2", BookmarkOptions::default());

        let ids: Vec<_> = bookmarks
            .list_for_book("/a.epub")
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);
        assert_eq!(first.created_at, 1_000);
        assert_eq!(bookmarks.total_count(), 3);
    }

    #[test]
    fn test_toggle_twice_restores_count() {
        let (_, _, bookmarks) = setup();
        bookmarks.add("/b.epub", "elsewhere", BookmarkOptions::default());
        let before = bookmarks.total_count();

        let created = bookmarks.toggle("/a.epub", "loc", BookmarkOptions::default());
        assert!(created.is_some());
        assert!(bookmarks.exists_at("/a.epub", "loc"));

        let removed = bookmarks.toggle("/a.epub", "loc", BookmarkOptions::default());
        assert!(removed.is_none());
        assert_eq!(bookmarks.total_count(), before);
    }

    #[test]
    fn test_concurrent_toggles_keep_location_unique() {
        use std::sync::Barrier;
        use std::thread;

        const THREADS: usize = 4;

        for _ in 0..100 {
            let (_, _, bookmarks) = setup();
            let bookmarks = Arc::new(bookmarks);
            let barrier = Arc::new(Barrier::new(THREADS));

            let workers: Vec<_> = (0..THREADS)
                .map(|_| {
                    let bookmarks = bookmarks.clone();
                    let barrier = barrier.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        bookmarks.toggle("/a.epub", "loc", BookmarkOptions::default());
                    })
                })
                .collect();
            for worker in workers {
                worker.join().unwrap();
            }

            let at_location = bookmarks
                .list_for_book("/a.epub")
                .iter()
                .filter(|b| b.is_at("loc"))
                .count();
            // 偶数次切换后位置上没有书签
            assert_eq!(at_location, 0);
            assert_eq!(bookmarks.total_count(), 0);
        }
    }

    #[test]
    fn test_removing_last_bookmark_drops_book_key() {
        let (backend, _, bookmarks) = setup();
        let keep = bookmarks.add("/b.epub", "x", BookmarkOptions::default());
        let only = bookmarks.add("/a.epub", "loc", BookmarkOptions::default());

        assert!(bookmarks.remove(&only.id));
        assert!(bookmarks.list_for_book("/a.epub").is_empty());

        let raw = backend.raw("sumi:bookmarks").unwrap();
        let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let obj = stored.as_object().unwrap();
        assert!(!obj.contains_key("/a.epub"));
        assert_eq!(obj["/b.epub"][0]["id"], keep.id.as_str());
    }

    #[test]
    fn test_remove_unknown_id_does_not_persist() {
        let (backend, _, bookmarks) = setup();
        assert!(!bookmarks.remove(&BookmarkId::from("missing")));
        assert_eq!(backend.raw("sumi:bookmarks"), None);
    }

    #[test]
    fn test_update_merges_provided_fields() {
        let (_, _, bookmarks) = setup();
        let bookmark = bookmarks.add(
            "/a.epub",
            "loc",
            BookmarkOptions {
                label: Some("old".to_string()),
                note: Some("keep me".to_string()),
                ..BookmarkOptions::default()
            },
        );

        let updated = bookmarks
            .update(
                &bookmark.id,
                BookmarkUpdate {
                    label: Some("new".to_string()),
                    note: None,
                },
            )
            .unwrap();
        assert_eq!(updated.label.as_deref(), Some("new"));
        assert_eq!(updated.note.as_deref(), Some("keep me"));
        assert_eq!(bookmarks.get(&bookmark.id), Some(updated));

        assert!(bookmarks
            .update(&BookmarkId::from("missing"), BookmarkUpdate::default())
            .is_none());
    }

    #[test]
    fn test_location_queries_use_exact_match() {
        let (_, _, bookmarks) = setup();
        let bookmark = bookmarks.add("/a.epub", "epubcfi(/6/4)", BookmarkOptions::default());

        assert_eq!(bookmarks.get_at("/a.epub", "epubcfi(/6/4)"), Some(bookmark));
        assert!(!bookmarks.exists_at("/a.epub", "epubcfi(/6/4) "));
        assert!(!bookmarks.exists_at("/b.epub", "epubcfi(/6/4)"));
    }

    #[test]
    fn test_clear_all_for_book() {
        let (_, _, bookmarks) = setup();
        bookmarks.add("/a.epub", "1", BookmarkOptions::default());
        bookmarks.add("/a.epub", "2", BookmarkOptions::default());
        bookmarks.add("/b.epub", "1", BookmarkOptions::default());

        assert_eq!(bookmarks.clear_all_for_book("/a.epub"), 2);
        assert_eq!(bookmarks.clear_all_for_book("/a.epub"), 0);
        assert_eq!(bookmarks.total_count(), 1);
    }

    #[test]
    fn test_active_book_view() {
        let (_, _, bookmarks) = setup();
        bookmarks.add("/a.epub", "1", BookmarkOptions::default());
        assert!(bookmarks.active_book_bookmarks().is_empty());

        bookmarks.set_active_book(Some("/a.epub"));
        assert_eq!(bookmarks.active_book_bookmarks().len(), 1);
    }

    #[test]
    fn test_reload_from_storage() {
        let (_, store, bookmarks) = setup();
        let bookmark = bookmarks.add("/a.epub", "loc", BookmarkOptions::labeled("x"));

        let reloaded = BookmarkStore::new(
            store,
            ManualScheduler::new(0).arc(),
            EventPublisher::new().arc(),
        );
        assert_eq!(reloaded.get(&bookmark.id), Some(bookmark));
    }
}
