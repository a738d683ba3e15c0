//! Dialog Adapter - 文件选择实现

mod static_file_picker;

pub use static_file_picker::StaticFilePicker;
