//! Static File Picker - 预置选择结果的文件选择器
//!
//! 无界面环境下代替原生对话框（例如命令行参数给出的文件）

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::ports::{FileFilter, FilePickerPort, PickerError};

#[derive(Debug, Clone, Default)]
pub struct StaticFilePicker {
    selection: Option<String>,
}

impl StaticFilePicker {
    /// 始终选择给定路径
    pub fn selecting(path: impl Into<String>) -> Self {
        Self {
            selection: Some(path.into()),
        }
    }

    /// 模拟用户取消
    pub fn cancelled() -> Self {
        Self { selection: None }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl FilePickerPort for StaticFilePicker {
    async fn open_dialog(&self, filters: &[FileFilter]) -> Result<Option<String>, PickerError> {
        let Some(path) = &self.selection else {
            return Ok(None);
        };

        let lower = path.to_lowercase();
        let accepted = filters.is_empty()
            || filters.iter().any(|filter| {
                filter
                    .extensions
                    .iter()
                    .any(|ext| lower.ends_with(&format!(".{}", ext.to_lowercase())))
            });

        if accepted {
            Ok(Some(path.clone()))
        } else {
            tracing::warn!(path = %path, "Selected file does not match dialog filters");
            Ok(None)
        }
    }
}
