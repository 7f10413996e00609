//! Playback Context - 播放句柄生命周期

mod errors;
mod handle;

pub use errors::PlaybackError;
pub use handle::{HandleId, HandleState, ObjectUrl, PlaybackHandle, SurfaceId};
