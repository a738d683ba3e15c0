//! 新书标题解析
//!
//! 优先使用外部元数据标题；否则从文件名推导。
//! 元数据查询失败时只做下划线替换，不做完整清洗。

use once_cell::sync::Lazy;
use regex::Regex;

use super::BookMetadata;

static RE_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[^/.]+$").unwrap());
static RE_DOUBLE_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*--\s*").unwrap());
static RE_HEX_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-f0-9]{32}\b").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// 解析得到的书名与作者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub title: String,
    pub author: Option<String>,
}

/// 文件名（去掉目录与扩展名）
pub fn file_stem(path: &str) -> String {
    let filename = match path.rsplit(['/', '\\']).next() {
        Some(name) if !name.is_empty() => name,
        _ => path,
    };
    RE_EXTENSION.replace(filename, "").into_owned()
}

/// 文件名启发式清洗
///
/// 1. 下划线替换为空格
/// 2. `--` 分隔符统一为 ` - `
/// 3. 删除独立的 32 位小写十六进制串
/// 4. 合并空白并去除首尾空白
pub fn sanitize_stem(stem: &str) -> String {
    let title = stem.replace('_', " ");
    let title = RE_DOUBLE_DASH.replace_all(&title, " - ");
    let title = RE_HEX_TOKEN.replace_all(&title, "");
    let title = RE_WHITESPACE.replace_all(&title, " ");
    title.trim().to_string()
}

/// 解析新书的标题与作者
///
/// `metadata` 为 `None` 表示外部查询失败
pub fn resolve_identity(path: &str, metadata: Option<&BookMetadata>) -> ResolvedIdentity {
    let stem = file_stem(path);

    let Some(metadata) = metadata else {
        return ResolvedIdentity {
            title: stem.replace('_', " "),
            author: None,
        };
    };

    let title = match non_blank(metadata.title.as_deref()) {
        Some(title) => title.to_string(),
        None => sanitize_stem(&stem),
    };
    let author = non_blank(metadata.author.as_deref()).map(str::to_string);

    ResolvedIdentity { title, author }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
