//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod events;
pub mod memory;
pub mod persistence;
pub mod runtime;

pub use events::{EventPublisher, StateEvent, VisibilityPublisher};
pub use memory::{InMemoryKvBackend, ManualScheduler};
pub use persistence::{SledKvBackend, SledStoreConfig};
pub use runtime::{SystemClock, TokioScheduler};
