//! Memory Layer - In-Memory State Management
//!
//! 实现对象 URL 存储和播放会话管理器，管理句柄与 surface 的内存状态

mod object_url_store;
mod playback_manager;

pub use object_url_store::InMemoryObjectUrlStore;
pub use playback_manager::InMemoryPlaybackManager;
