//! Metadata Adapter - 元数据解析实现

mod static_resolver;

pub use static_resolver::StaticMetadataResolver;
