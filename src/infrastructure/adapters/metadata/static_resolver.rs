//! Static Metadata Resolver - 预置元数据的解析器
//!
//! 不读取文件内容，只返回预先登记的元数据；
//! 未登记的路径返回空元数据（标题由文件名推导）

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::application::ports::{MetadataError, MetadataResolverPort};
use crate::domain::book::BookMetadata;

#[derive(Debug, Clone, Default)]
pub struct StaticMetadataResolver {
    entries: HashMap<String, BookMetadata>,
    failing: HashSet<String>,
}

impl StaticMetadataResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记某个路径的元数据
    pub fn with_entry(mut self, path: impl Into<String>, metadata: BookMetadata) -> Self {
        self.entries.insert(path.into(), metadata);
        self
    }

    /// 某个路径的查询直接失败
    pub fn failing_for(mut self, path: impl Into<String>) -> Self {
        self.failing.insert(path.into());
        self
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl MetadataResolverPort for StaticMetadataResolver {
    async fn resolve(&self, path: &str) -> Result<BookMetadata, MetadataError> {
        if self.failing.contains(path) {
            return Err(MetadataError::ExtractionFailed(format!(
                "metadata lookup disabled for {}",
                path
            )));
        }

        let metadata = self.entries.get(path).cloned().unwrap_or_default();
        tracing::debug!(
            path = %path,
            has_title = metadata.title.is_some(),
            has_author = metadata.author.is_some(),
            "StaticMetadataResolver: returning registered metadata"
        );
        Ok(metadata)
    }
}
