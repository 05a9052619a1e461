//! Domain types.
//!
//! Chat exchange types consumed from the surrounding application, the model
//! name codec, and the per-family file manifests used for local validation.

mod chat;
mod manifest;
mod model_name;

pub use chat::{
    ChatChoice, ChatChunkChoice, ChatCompletion, ChatCompletionChunk, ChatDelta, ChatMessage,
    ChatRequest, MessageRole, Usage,
};
pub use manifest::ModelManifest;
pub use model_name::{COMPONENT_SEPARATOR, NameCodec, join_components, repository_id, split_components};
