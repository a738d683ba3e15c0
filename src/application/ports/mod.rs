//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层、外部协作方之间的抽象接口

mod file_picker;
mod kv_backend;
mod metadata_resolver;
mod scheduler;
mod visibility;

pub use file_picker::{FileFilter, FilePickerPort, PickerError};
pub use kv_backend::{KvBackendPort, StorageError};
pub use metadata_resolver::{MetadataError, MetadataResolverPort};
pub use scheduler::{ClockPort, SchedulerPort, TimerCallback, TimerHandle};
pub use visibility::{ListenerId, Visibility, VisibilityListener, VisibilitySourcePort};
