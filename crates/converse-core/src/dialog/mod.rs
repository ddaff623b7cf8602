//! Dialog (chat assistant) configuration.
//!
//! Create and update requests flow through [`translate::decode_chat`], then
//! [`DefaultTemplate::assemble`] or [`DialogConfig::apply`], then
//! [`ConsistencyValidator::validate_all`] before anything is persisted;
//! [`prepare_create`] and [`prepare_update`] run that sequence. Reads go back
//! out through [`translate::encode`].

mod defaults;
mod model;
mod patch;
mod pipeline;
#[cfg(test)]
pub(crate) mod testing;
pub mod translate;
mod validate;

pub use defaults::DefaultTemplate;
pub use model::{
    DecodedPrompt, DialogConfig, LlmSetting, MAX_NAME_LENGTH, PromptConfig, PromptDraft,
    PromptParameter, RetrievalDraft,
};
pub use patch::DialogPatch;
pub use pipeline::{prepare_create, prepare_update};
pub use translate::{ChatRepresentation, ChatRequest, LlmRequest, PromptField};
pub use validate::{
    BUILTIN_RERANK_MODELS, ConsistencyValidator, DialogCatalog, KnowledgeBaseSummary, ModelKind,
    embedding_family,
};
