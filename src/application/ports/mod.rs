//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod authorizer;
mod generation_backend;
mod object_url_store;
mod playback_session;
mod player;

pub use authorizer::{AuthContext, AuthorizerPort};
pub use generation_backend::{GenerationBackendPort, UpstreamReply};
pub use object_url_store::{ObjectUrlStorePort, StoredObject};
pub use playback_session::{PlaybackOutcome, PlaybackSessionPort, SurfaceScope};
pub use player::{PlaybackSource, PlayerError, PlayerPort};
