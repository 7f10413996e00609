//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod auth;
pub mod backend;
pub mod player;

pub use auth::*;
pub use backend::*;
pub use player::*;
