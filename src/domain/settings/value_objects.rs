//! Settings Context - Value Objects

use serde::{Deserialize, Serialize};

use super::bounds;

/// 字体族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    Serif,
    #[default]
    SansSerif,
    Monospace,
}

/// 文本对齐
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Justify,
}

/// 阅读器排版设置（完整记录）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderSettings {
    pub font_family: FontFamily,
    pub font_size: i32,
    pub line_height: f64,
    pub margin_horizontal: i32,
    pub margin_vertical: i32,
    pub text_align: TextAlign,
}

pub const DEFAULT_FONT_SIZE: i32 = 16;

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            font_family: FontFamily::SansSerif,
            font_size: DEFAULT_FONT_SIZE,
            line_height: 1.5,
            margin_horizontal: 40,
            margin_vertical: 40,
            text_align: TextAlign::Justify,
        }
    }
}

impl ReaderSettings {
    /// 用补丁中存在的字段覆盖当前值（不做校验）
    pub fn merged(&self, patch: &ReaderSettingsPatch) -> Self {
        Self {
            font_family: patch.font_family.unwrap_or(self.font_family),
            font_size: patch.font_size.unwrap_or(self.font_size),
            line_height: patch.line_height.unwrap_or(self.line_height),
            margin_horizontal: patch.margin_horizontal.unwrap_or(self.margin_horizontal),
            margin_vertical: patch.margin_vertical.unwrap_or(self.margin_vertical),
            text_align: patch.text_align.unwrap_or(self.text_align),
        }
    }

    /// 钳制全部数值字段
    pub fn validated(&self) -> Self {
        Self {
            font_family: self.font_family,
            font_size: bounds::clamp_font_size(self.font_size),
            line_height: bounds::clamp_line_height(self.line_height),
            margin_horizontal: bounds::clamp_margin(self.margin_horizontal),
            margin_vertical: bounds::clamp_margin(self.margin_vertical),
            text_align: self.text_align,
        }
    }
}

/// 部分设置
///
/// 既用作更新请求，也用作按书覆盖层的存储形态
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderSettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<FontFamily>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_horizontal: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_vertical: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
}

impl ReaderSettingsPatch {
    pub fn font_size(size: i32) -> Self {
        Self {
            font_size: Some(size),
            ..Self::default()
        }
    }

    /// 钳制所有存在的数值字段，非数值字段原样保留
    pub fn validated(&self) -> Self {
        Self {
            font_family: self.font_family,
            font_size: self.font_size.map(bounds::clamp_font_size),
            line_height: self.line_height.map(bounds::clamp_line_height),
            margin_horizontal: self.margin_horizontal.map(bounds::clamp_margin),
            margin_vertical: self.margin_vertical.map(bounds::clamp_margin),
            text_align: self.text_align,
        }
    }

    /// 后者存在的字段覆盖前者
    pub fn overlay(&self, other: &ReaderSettingsPatch) -> Self {
        Self {
            font_family: other.font_family.or(self.font_family),
            font_size: other.font_size.or(self.font_size),
            line_height: other.line_height.or(self.line_height),
            margin_horizontal: other.margin_horizontal.or(self.margin_horizontal),
            margin_vertical: other.margin_vertical.or(self.margin_vertical),
            text_align: other.text_align.or(self.text_align),
        }
    }
}

/// 存储中的全局设置
///
/// 旧版本写入的记录可能缺字段，加载时叠加到默认值之上
pub fn global_from_stored(stored: &ReaderSettingsPatch) -> ReaderSettings {
    ReaderSettings::default().merged(stored)
}
