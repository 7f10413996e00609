//! HTTP Handlers

mod generate;
mod ping;
mod playback;
mod surface;
mod websocket;

pub use generate::*;
pub use ping::*;
pub use playback::*;
pub use surface::*;
pub use websocket::*;
