//! Book Catalog
//!
//! 已知书籍列表与当前书指针。
//! 存储顺序没有语义，最近阅读、进行中等视图都在读取时派生，不做缓存。

use parking_lot::Mutex;
use std::cmp::Reverse;
use std::sync::Arc;

use crate::application::ports::{ClockPort, FileFilter, FilePickerPort, MetadataResolverPort};
use crate::application::storage::{KvStore, StorageKey};
use crate::domain::book::{resolve_identity, Book, ReadingLocation, ReadingProgress};
use crate::domain::stats::format_duration;
use crate::infrastructure::events::EventPublisher;

#[derive(Default)]
struct CatalogState {
    books: Vec<Book>,
    active_path: Option<String>,
}

impl CatalogState {
    fn position(&self, path: &str) -> Option<usize> {
        self.books.iter().position(|b| b.path() == path)
    }

    fn find(&self, path: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.path() == path)
    }

    /// 移到列表头部
    fn move_to_front(&mut self, index: usize) {
        if index > 0 {
            let book = self.books.remove(index);
            self.books.insert(0, book);
        }
    }
}

/// 书库
pub struct BookCatalog {
    store: KvStore,
    clock: Arc<dyn ClockPort>,
    resolver: Arc<dyn MetadataResolverPort>,
    events: Arc<EventPublisher>,
    state: Mutex<CatalogState>,
}

impl BookCatalog {
    pub fn new(
        store: KvStore,
        clock: Arc<dyn ClockPort>,
        resolver: Arc<dyn MetadataResolverPort>,
        events: Arc<EventPublisher>,
    ) -> Self {
        let mut books: Vec<Book> = store.get(StorageKey::RecentBooks, Vec::new());
        let loaded = books.len();
        // 路径唯一，重复条目保留第一条
        let mut seen = std::collections::HashSet::new();
        books.retain(|b| seen.insert(b.path().to_string()));
        if books.len() != loaded {
            tracing::warn!(
                dropped = loaded - books.len(),
                "Duplicate catalog entries dropped on load"
            );
        }

        tracing::info!(books = books.len(), "BookCatalog loaded");

        Self {
            store,
            clock,
            resolver,
            events,
            state: Mutex::new(CatalogState {
                books,
                active_path: None,
            }),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    // ------------------------------------------------------------------
    // Open / remove
    // ------------------------------------------------------------------

    /// 打开书籍
    ///
    /// 已知书籍更新最近阅读时间并移到头部；
    /// 新书先解析标题与作者再插入头部。两种情况都会持久化。
    pub async fn open(&self, path: &str) -> Book {
        {
            let mut state = self.state.lock();
            state.active_path = Some(path.to_string());

            if let Some(index) = state.position(path) {
                let now = self.clock.now_ms();
                state.books[index].touch(now);
                state.move_to_front(index);
                let book = state.books[0].clone();
                self.persist(&state);
                drop(state);

                tracing::debug!(path = %path, "Reopened known book");
                self.events.publish_active_book_changed(Some(path));
                self.events.publish_catalog_changed();
                return book;
            }
        }

        // 外部查询期间不持有锁
        let metadata = match self.resolver.resolve(path).await {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Metadata lookup failed, using filename");
                None
            }
        };
        let identity = resolve_identity(path, metadata.as_ref());

        let mut state = self.state.lock();
        let now = self.clock.now_ms();
        // 查询期间可能已被并发打开
        let book = match state.position(path) {
            Some(index) => {
                state.books[index].touch(now);
                state.move_to_front(index);
                state.books[0].clone()
            }
            None => {
                let book = Book::new(path, identity.title, identity.author, now);
                state.books.insert(0, book.clone());
                tracing::info!(path = %path, title = %book.title(), "Book added to catalog");
                book
            }
        };
        self.persist(&state);
        drop(state);

        self.events.publish_active_book_changed(Some(path));
        self.events.publish_catalog_changed();
        book
    }

    /// 通过文件选择器打开，取消或失败时什么都不做
    pub async fn open_file(&self, picker: &dyn FilePickerPort) -> Option<Book> {
        match picker.open_dialog(&[FileFilter::ebooks()]).await {
            Ok(Some(path)) => Some(self.open(&path).await),
            Ok(None) => {
                tracing::debug!("File dialog cancelled");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "File dialog failed");
                None
            }
        }
    }

    /// 删除书籍
    ///
    /// 不级联删除该路径的书签、设置与统计
    pub fn remove(&self, path: &str) -> bool {
        let mut state = self.state.lock();
        let Some(index) = state.position(path) else {
            return false;
        };
        state.books.remove(index);
        let was_active = state.active_path.as_deref() == Some(path);
        if was_active {
            state.active_path = None;
        }
        self.persist(&state);
        drop(state);

        tracing::info!(path = %path, "Book removed from catalog");
        if was_active {
            self.events.publish_active_book_changed(None);
        }
        self.events.publish_catalog_changed();
        true
    }

    /// 清空当前书指针
    pub fn close_active(&self) {
        let previous = self.state.lock().active_path.take();
        if previous.is_some() {
            self.events.publish_active_book_changed(None);
        }
    }

    // ------------------------------------------------------------------
    // Progress
    // ------------------------------------------------------------------

    /// 整体替换阅读位置；未知路径不做任何事，也不持久化
    pub fn update_progress(&self, path: &str, location: ReadingLocation) -> bool {
        let mut state = self.state.lock();
        let Some(index) = state.position(path) else {
            return false;
        };
        let now = self.clock.now_ms();
        state.books[index].apply_location(location, now);
        state.move_to_front(index);
        self.persist(&state);
        drop(state);

        self.events.publish_catalog_changed();
        true
    }

    pub fn get_progress(&self, path: &str) -> Option<ReadingProgress> {
        self.state.lock().find(path).map(Book::progress_snapshot)
    }

    /// 清除位置与进度，保留总页数
    pub fn clear_progress(&self, path: &str) -> bool {
        self.mutate(path, Book::clear_progress)
    }

    pub fn add_reading_time(&self, path: &str, seconds: f64) -> bool {
        self.mutate(path, |book| book.add_reading_time(seconds))
    }

    /// 格式化累计阅读时间，未知路径视为 0
    pub fn formatted_reading_time(&self, path: &str) -> String {
        let seconds = self
            .state
            .lock()
            .find(path)
            .map(Book::reading_time)
            .unwrap_or(0.0);
        format_duration(seconds)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// 存储顺序的全部书籍
    pub fn books(&self) -> Vec<Book> {
        self.state.lock().books.clone()
    }

    pub fn get(&self, path: &str) -> Option<Book> {
        self.state.lock().find(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn active_book_path(&self) -> Option<String> {
        self.state.lock().active_path.clone()
    }

    pub fn active_book(&self) -> Option<Book> {
        let state = self.state.lock();
        state
            .active_path
            .as_deref()
            .and_then(|path| state.find(path))
            .cloned()
    }

    /// 按最近阅读时间降序，缺失时间的排在最后（稳定排序）
    pub fn recently_read_books(&self) -> Vec<Book> {
        let mut books = self.books();
        books.sort_by_key(|b| Reverse(b.recency_key()));
        books
    }

    pub fn last_read_book(&self) -> Option<Book> {
        self.recently_read_books().into_iter().next()
    }

    /// 0 < progress < 1 的书籍
    pub fn in_progress_books(&self) -> Vec<Book> {
        self.state
            .lock()
            .books
            .iter()
            .filter(|b| b.is_in_progress())
            .cloned()
            .collect()
    }

    fn mutate(&self, path: &str, f: impl FnOnce(&mut Book)) -> bool {
        let mut state = self.state.lock();
        let Some(index) = state.position(path) else {
            return false;
        };
        f(&mut state.books[index]);
        self.persist(&state);
        drop(state);

        self.events.publish_catalog_changed();
        true
    }

    fn persist(&self, state: &CatalogState) -> bool {
        self.store.set(StorageKey::RecentBooks, &state.books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::storage::DEFAULT_NAMESPACE;
    use crate::domain::book::BookMetadata;
    use crate::infrastructure::adapters::{StaticFilePicker, StaticMetadataResolver};
    use crate::infrastructure::events::StateEvent;
    use crate::infrastructure::memory::{InMemoryKvBackend, ManualScheduler};

    struct Fixture {
        backend: Arc<InMemoryKvBackend>,
        clock: Arc<ManualScheduler>,
        catalog: BookCatalog,
    }

    fn fixture(resolver: StaticMetadataResolver) -> Fixture {
        let backend = InMemoryKvBackend::new().arc();
        let clock = ManualScheduler::new(1_000).arc();
        let catalog = BookCatalog::new(
            KvStore::new(backend.clone(), DEFAULT_NAMESPACE),
            clock.clone(),
            resolver.arc(),
            EventPublisher::new().arc(),
        );
        Fixture {
            backend,
            clock,
            catalog,
        }
    }

    #[tokio::test]
    async fn test_open_new_book_resolves_metadata() {
        let f = fixture(StaticMetadataResolver::new().with_entry(
            "/books/dune.epub",
            BookMetadata::new(Some("Dune"), Some("Frank Herbert")),
        ));

        let book = f.catalog.open("/books/dune.epub").await;
        assert_eq!(book.title(), "Dune");
        assert_eq!(book.author(), Some("Frank Herbert"));
        assert_eq!(book.added_at(), 1_000);
        assert_eq!(book.last_read_at(), Some(1_000));
        assert_eq!(f.catalog.active_book_path().as_deref(), Some("/books/dune.epub"));
        assert!(f.backend.raw("sumi:recentBooks").is_some());
    }

    #[tokio::test]
    async fn test_open_without_metadata_sanitizes_filename() {
        let f = fixture(StaticMetadataResolver::new());
        let book = f
            .catalog
            .open("/dl/Some_Book_Title--1a2b3c4d5e6f7890a1b2c3d4e5f6a7b8.epub")
            .await;
        assert_eq!(book.title(), "Some Book Title -");
        assert_eq!(book.author(), None);
    }

    #[tokio::test]
    async fn test_failed_lookup_uses_plain_filename() {
        let f = fixture(StaticMetadataResolver::new().failing_for("/dl/my_book--draft.pdf"));
        let book = f.catalog.open("/dl/my_book--draft.pdf").await;
        assert_eq!(book.title(), "my book--draft");
        assert_eq!(f.catalog.len(), 1);
    }

    #[tokio::test]
    async fn test_reopen_moves_to_front_without_duplicates() {
        let f = fixture(StaticMetadataResolver::new());
        f.catalog.open("/a.epub").await;
        f.clock.advance_secs(1);
        f.catalog.open("/b.epub").await;
        f.clock.advance_secs(1);
        let reopened = f.catalog.open("/a.epub").await;

        assert_eq!(reopened.added_at(), 1_000);
        assert_eq!(reopened.last_read_at(), Some(3_000));
        let paths: Vec<_> = f.catalog.books().iter().map(|b| b.path().to_string()).collect();
        assert_eq!(paths, vec!["/a.epub", "/b.epub"]);
        assert_eq!(f.catalog.last_read_book().unwrap().path(), "/a.epub");
    }

    #[tokio::test]
    async fn test_update_progress() {
        let f = fixture(StaticMetadataResolver::new());
        f.catalog.open("/a.epub").await;
        f.catalog.open("/b.epub").await;
        f.clock.advance_secs(5);

        assert!(f.catalog.update_progress(
            "/a.epub",
            ReadingLocation::new("cfi", 0.25).with_pages(10, 40),
        ));
        let progress = f.catalog.get_progress("/a.epub").unwrap();
        assert_eq!(progress.progress, 0.25);
        assert_eq!(progress.total_pages, Some(40));
        assert_eq!(f.catalog.books()[0].path(), "/a.epub");
        assert_eq!(f.catalog.in_progress_books().len(), 1);
    }

    #[tokio::test]
    async fn test_update_progress_unknown_path_is_noop() {
        let f = fixture(StaticMetadataResolver::new());
        assert!(!f.catalog.update_progress("/ghost.epub", ReadingLocation::new("x", 0.5)));
        assert_eq!(f.backend.raw("sumi:recentBooks"), None);
    }

    #[tokio::test]
    async fn test_clear_progress_and_reading_time() {
        let f = fixture(StaticMetadataResolver::new());
        f.catalog.open("/a.epub").await;
        f.catalog
            .update_progress("/a.epub", ReadingLocation::new("x", 0.5).with_pages(5, 10));
        assert!(f.catalog.clear_progress("/a.epub"));

        let book = f.catalog.get("/a.epub").unwrap();
        assert_eq!(book.progress(), 0.0);
        assert_eq!(book.total_pages(), Some(10));

        f.catalog.add_reading_time("/a.epub", 3000.0);
        f.catalog.add_reading_time("/a.epub", 1200.0);
        assert_eq!(f.catalog.formatted_reading_time("/a.epub"), "1h 10m");
        assert_eq!(f.catalog.formatted_reading_time("/ghost.epub"), "0m");
    }

    #[tokio::test]
    async fn test_recency_sort_puts_missing_timestamps_last() {
        let backend = InMemoryKvBackend::new().arc();
        backend.insert_raw(
            "sumi:recentBooks",
            r#"[{"path":"/old.epub","title":"Old","addedAt":1},
                {"path":"/new.epub","title":"New","addedAt":1,"lastReadAt":50},
                {"path":"/mid.epub","title":"Mid","addedAt":1,"lastReadAt":20}]"#,
        );
        let catalog = BookCatalog::new(
            KvStore::new(backend, DEFAULT_NAMESPACE),
            ManualScheduler::new(0).arc(),
            StaticMetadataResolver::new().arc(),
            EventPublisher::new().arc(),
        );

        let order: Vec<_> = catalog
            .recently_read_books()
            .iter()
            .map(|b| b.path().to_string())
            .collect();
        assert_eq!(order, vec!["/new.epub", "/mid.epub", "/old.epub"]);
        assert_eq!(catalog.books()[0].path(), "/old.epub");
    }

    #[tokio::test]
    async fn test_remove_clears_active_pointer() {
        let f = fixture(StaticMetadataResolver::new());
        f.catalog.open("/a.epub").await;
        assert!(f.catalog.remove("/a.epub"));
        assert!(!f.catalog.remove("/a.epub"));
        assert!(f.catalog.is_empty());
        assert_eq!(f.catalog.active_book(), None);
    }

    #[tokio::test]
    async fn test_open_file_through_picker() {
        let f = fixture(StaticMetadataResolver::new());
        assert!(f.catalog.open_file(&StaticFilePicker::cancelled()).await.is_none());
        assert!(f.catalog.is_empty());

        let book = f
            .catalog
            .open_file(&StaticFilePicker::selecting("/x/The_Hobbit.epub"))
            .await
            .unwrap();
        assert_eq!(book.title(), "The Hobbit");
    }

    #[tokio::test]
    async fn test_open_publishes_events() {
        let events = EventPublisher::new().arc();
        let mut rx = events.subscribe();
        let catalog = BookCatalog::new(
            KvStore::new(InMemoryKvBackend::new().arc(), DEFAULT_NAMESPACE),
            ManualScheduler::new(0).arc(),
            StaticMetadataResolver::new().arc(),
            events,
        );
        catalog.open("/a.epub").await;

        assert_eq!(
            rx.try_recv().unwrap(),
            StateEvent::ActiveBookChanged {
                book_path: Some("/a.epub".to_string())
            }
        );
        assert_eq!(rx.try_recv().unwrap(), StateEvent::CatalogChanged);
    }
}
