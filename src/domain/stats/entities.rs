//! Stats Context - Entities

use serde::{Deserialize, Serialize};

/// 单本书的阅读统计
///
/// 只由会话跟踪器修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookStatistics {
    pub book_path: String,
    /// 累计阅读时间（秒，可含小数）
    #[serde(default)]
    pub total_time: f64,
    #[serde(default)]
    pub session_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_opened: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_read: Option<i64>,
}

impl BookStatistics {
    pub fn new(book_path: impl Into<String>, first_opened: i64, now: i64) -> Self {
        Self {
            book_path: book_path.into(),
            total_time: 0.0,
            session_count: 0,
            first_opened: Some(first_opened),
            last_read: Some(now),
        }
    }
}

/// 秒数格式化为 `"Hh Mm"` 或 `"Mm"`，小时为零时省略小时项
pub fn format_duration(seconds: f64) -> String {
    if seconds.is_nan() || seconds <= 0.0 {
        return "0m".to_string();
    }
    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0m");
        assert_eq!(format_duration(-12.0), "0m");
        assert_eq!(format_duration(59.9), "0m");
        assert_eq!(format_duration(60.0), "1m");
        assert_eq!(format_duration(3599.0), "59m");
        assert_eq!(format_duration(3600.0), "1h 0m");
        assert_eq!(format_duration(3.0 * 3600.0 + 5.0 * 60.0 + 42.0), "3h 5m");
    }

    #[test]
    fn test_stats_wire_format() {
        let stats: BookStatistics =
            serde_json::from_str(r#"{"bookPath":"/a.epub","totalTime":12.5,"sessionCount":2}"#)
                .unwrap();
        assert_eq!(stats.first_opened, None);
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(json, r#"{"bookPath":"/a.epub","totalTime":12.5,"sessionCount":2}"#);
    }
}
