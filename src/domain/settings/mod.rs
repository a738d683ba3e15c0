//! Settings Context - 排版设置限界上下文
//!
//! 职责:
//! - 全局设置与按书覆盖的值对象
//! - 数值边界与钳制

pub mod bounds;
mod value_objects;

pub use value_objects::{
    global_from_stored, FontFamily, ReaderSettings, ReaderSettingsPatch, TextAlign,
    DEFAULT_FONT_SIZE,
};
