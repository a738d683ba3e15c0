//! Sumi - 电子书阅读器本地状态引擎
//!
//! 用法: `sumi [book-path]`
//!
//! 打开状态库，给出路径时打开该书并开始阅读会话，
//! 收到 Ctrl-C 后结束会话并退出。

use std::sync::Arc;

use sumi::application::{
    BookCatalog, BookmarkStore, KvStore, ReadingStatsTracker, SettingsStore,
};
use sumi::config::{load_config, print_config};
use sumi::domain::stats::format_duration;
use sumi::infrastructure::adapters::{StaticFilePicker, StaticMetadataResolver};
use sumi::infrastructure::events::{EventPublisher, VisibilityPublisher};
use sumi::infrastructure::persistence::{SledKvBackend, SledStoreConfig};
use sumi::infrastructure::runtime::TokioScheduler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!("{},sumi={}", config.log.level, config.log.level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Sumi - e-book reader state engine");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.storage.db_path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 存储
    let backend = SledKvBackend::new(&SledStoreConfig {
        db_path: config.storage.db_path.clone(),
        flush_on_write: config.storage.flush_on_write,
    })?
    .arc();
    let store = KvStore::new(backend, config.storage.namespace.clone());

    // 事件与调度
    let events = EventPublisher::new().arc();
    let scheduler = TokioScheduler::try_current()?.arc();
    let visibility = VisibilityPublisher::new().arc();

    // 引擎
    let catalog = BookCatalog::new(
        store.clone(),
        scheduler.clone(),
        StaticMetadataResolver::new().arc(),
        events.clone(),
    )
    .arc();
    let settings = SettingsStore::new(store.clone(), events.clone()).arc();
    let bookmarks = BookmarkStore::new(store.clone(), scheduler.clone(), events.clone()).arc();
    let tracker = ReadingStatsTracker::new(
        store,
        scheduler.clone(),
        config.session.clone(),
        events.clone(),
    )
    .arc();
    tracker.attach_visibility(visibility.clone());

    // 打开命令行给出的书
    if let Some(path) = std::env::args().nth(1) {
        let picker = StaticFilePicker::selecting(path);
        if let Some(book) = catalog.open_file(&picker).await {
            settings.set_active_book(Some(book.path()));
            bookmarks.set_active_book(Some(book.path()));
            tracker.start_session(book.path());

            let effective = settings.active_settings();
            tracing::info!(
                title = %book.title(),
                author = book.author().unwrap_or("-"),
                progress = book.progress(),
                font_size = effective.font_size,
                bookmarks = bookmarks.active_book_bookmarks().len(),
                "Reading"
            );
        }
    }

    log_library(&catalog, &tracker);

    tracing::info!("Press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("Received shutdown signal");

    // 结束会话并写回统计
    tracker.cleanup();
    tracing::info!(
        books = catalog.len(),
        bookmarks = bookmarks.total_count(),
        "Shutdown complete"
    );

    Ok(())
}

/// 打印最近阅读列表
fn log_library(catalog: &Arc<BookCatalog>, tracker: &Arc<ReadingStatsTracker>) {
    let books = catalog.recently_read_books();
    tracing::info!(
        books = books.len(),
        in_progress = catalog.in_progress_books().len(),
        "Library"
    );
    for book in books {
        tracing::info!(
            path = %book.path(),
            title = %book.title(),
            progress = %format!("{:.0}%", book.progress() * 100.0),
            reading_time = %format_duration(tracker.reading_time_for(book.path())),
            "  book"
        );
    }
}
