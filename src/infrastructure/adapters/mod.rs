//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod dialog;
pub mod metadata;

pub use dialog::*;
pub use metadata::*;
