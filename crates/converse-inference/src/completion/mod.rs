//! OpenAI-compatible completions over the inference engine.

mod adapter;
mod stream;

pub use self::adapter::{
    CompletionAdapter, CompletionAnswer, CompletionContext, CompletionOutcome,
    DEFAULT_CHANNEL_CAPACITY, NO_VALID_MESSAGES,
};
pub use self::stream::CompletionStream;
