//! Generation Context - 生成请求与结果

mod errors;
pub mod media_type;
mod result;
mod value_objects;

pub use errors::{GenerationError, GenerationErrorKind, UpstreamStage, USER_FACING_FAILURE};
pub use result::{BeatReference, GenerationResult, InlineAudio};
pub use value_objects::{
    Attachment, AttachmentMeta, AttachmentRole, GenerationRequest, GenerationSettings,
    GenerationTarget,
};
