//! Worker Layer - Background Task Processing
//!
//! 实现 GcWorker，定期回收过期的播放句柄

mod gc_worker;

pub use gc_worker::{GcWorker, GcWorkerConfig};
