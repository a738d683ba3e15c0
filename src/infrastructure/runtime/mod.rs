//! Runtime Layer - 真实时钟与定时器

mod tokio_scheduler;

pub use tokio_scheduler::{SystemClock, TokioScheduler};
