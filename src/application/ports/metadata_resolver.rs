//! Metadata Resolver Port - 书籍元数据解析
//!
//! 原生元数据提取（EPUB/PDF 的标题与作者）在本层之外，
//! 这里只定义调用接口

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::book::BookMetadata;

/// 元数据解析错误
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("File does not exist: {0}")]
    NotFound(String),

    #[error("Unsupported file type: {0}")]
    Unsupported(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),
}

/// Metadata Resolver Port
#[async_trait]
pub trait MetadataResolverPort: Send + Sync {
    /// 解析标题与作者，两者都可能缺失
    async fn resolve(&self, path: &str) -> Result<BookMetadata, MetadataError>;
}
