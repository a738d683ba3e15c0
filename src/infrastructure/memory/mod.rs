//! Memory Layer - In-Memory Adapters
//!
//! 不依赖磁盘和真实时钟的实现，用于测试与临时会话

mod kv_backend;
mod manual_scheduler;

pub use kv_backend::InMemoryKvBackend;
pub use manual_scheduler::ManualScheduler;
