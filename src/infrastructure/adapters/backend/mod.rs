//! Generation Backend Adapter - 生成服务客户端实现

mod fake_generation_client;
mod http_generation_client;

pub use fake_generation_client::{silent_wav, wav_header_stub, FakeGenerationClient};
pub use http_generation_client::*;
