//! Sled Persistence - 嵌入式 KV 存储

mod kv_backend;

pub use kv_backend::{SledKvBackend, SledStoreConfig};
