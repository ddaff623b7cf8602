//! OpenAI-compatible wire types.

mod message;
mod request;
mod response;

pub use self::message::{CompletionMessage, Role};
pub use self::request::CompletionRequest;
pub use self::response::{
    ChatCompletion, ChatCompletionChunk, ChunkChoice, CompletionChoice, Delta, FinishReason, Usage,
};
