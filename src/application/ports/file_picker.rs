//! File Picker Port - 原生文件选择对话框

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PickerError {
    #[error("Dialog failed: {0}")]
    DialogFailed(String),
}

/// 文件类型过滤器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl FileFilter {
    /// 阅读器支持的电子书格式
    pub fn ebooks() -> Self {
        Self {
            name: "Ebooks".to_string(),
            extensions: vec!["epub".to_string(), "pdf".to_string()],
        }
    }
}

/// File Picker Port
#[async_trait]
pub trait FilePickerPort: Send + Sync {
    /// 打开对话框，用户取消时返回 `Ok(None)`
    async fn open_dialog(&self, filters: &[FileFilter]) -> Result<Option<String>, PickerError>;
}
