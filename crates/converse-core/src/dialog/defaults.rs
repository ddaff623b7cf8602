//! Built-in default template for new dialogs.

use std::sync::LazyLock;

use uuid::Uuid;

use super::model::{DialogConfig, PromptConfig, PromptDraft, PromptParameter, checked_name};
use super::patch::DialogPatch;
use crate::Result;

const DEFAULT_SYSTEM_PROMPT: &str = "You are an intelligent assistant. Please summarize the \
content of the knowledge base to answer the question. Please list the data in the knowledge base \
and answer in detail. When all knowledge base content is irrelevant to the question, your answer \
must include the sentence \"The answer you are looking for is not found in the knowledge base!\" \
Answers need to consider chat history.
Here is the knowledge base:
{knowledge}
The above is the knowledge base.";

static DEFAULT_TEMPLATE: LazyLock<DefaultTemplate> = LazyLock::new(DefaultTemplate::builtin);

/// Values used for every field a caller leaves out.
///
/// Read-only after construction; [`DefaultTemplate::global`] hands out the
/// process-wide instance.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultTemplate {
    pub prompt: PromptConfig,
    pub description: String,
    pub similarity_threshold: f64,
    pub vector_similarity_weight: f64,
    pub top_n: i32,
    pub top_k: i32,
    pub rerank_id: String,
}

impl DefaultTemplate {
    /// Returns the built-in template shared by the whole process.
    pub fn global() -> &'static Self {
        &DEFAULT_TEMPLATE
    }

    fn builtin() -> Self {
        Self {
            prompt: PromptConfig {
                system: DEFAULT_SYSTEM_PROMPT.to_owned(),
                prologue: "Hi! I'm your assistant, what can I do for you?".to_owned(),
                parameters: vec![PromptParameter::required("knowledge")],
                empty_response: "Sorry! No relevant content was found in the knowledge base!"
                    .to_owned(),
                quote: true,
                tts: false,
                refine_multiturn: true,
            },
            description: "A helpful Assistant".to_owned(),
            similarity_threshold: 0.2,
            vector_similarity_weight: 0.3,
            top_n: 6,
            top_k: 1024,
            rerank_id: String::new(),
        }
    }

    /// Fills absent prompt fields from the template.
    ///
    /// An empty `system` is treated as absent. Every other field falls back
    /// only when it is missing.
    pub fn assemble_prompt(&self, draft: PromptDraft) -> PromptConfig {
        let defaults = &self.prompt;
        PromptConfig {
            system: draft
                .system
                .filter(|system| !system.is_empty())
                .unwrap_or_else(|| defaults.system.clone()),
            prologue: draft.prologue.unwrap_or_else(|| defaults.prologue.clone()),
            parameters: draft
                .parameters
                .unwrap_or_else(|| defaults.parameters.clone()),
            empty_response: draft
                .empty_response
                .unwrap_or_else(|| defaults.empty_response.clone()),
            quote: draft.quote.unwrap_or(defaults.quote),
            tts: draft.tts.unwrap_or(defaults.tts),
            refine_multiturn: draft.refine_multiturn.unwrap_or(defaults.refine_multiturn),
        }
    }

    /// Builds a new dialog from a decoded create request.
    ///
    /// `fallback_llm_id` is the tenant's default chat model, used when the
    /// request names none.
    pub fn assemble(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        patch: DialogPatch,
        fallback_llm_id: &str,
    ) -> Result<DialogConfig> {
        let name = checked_name(patch.name.unwrap_or_default())?;

        let prompt = patch.prompt.unwrap_or_default();
        let retrieval = prompt.retrieval;

        Ok(DialogConfig {
            id,
            tenant_id,
            name,
            description: patch
                .description
                .unwrap_or_else(|| self.description.clone()),
            icon: patch.icon.unwrap_or_default(),
            llm_id: patch
                .llm_id
                .filter(|llm_id| !llm_id.is_empty())
                .unwrap_or_else(|| fallback_llm_id.to_owned()),
            llm_setting: patch.llm_setting.unwrap_or_default(),
            prompt_config: self.assemble_prompt(prompt.config),
            similarity_threshold: retrieval
                .similarity_threshold
                .unwrap_or(self.similarity_threshold),
            vector_similarity_weight: retrieval
                .vector_similarity_weight
                .unwrap_or(self.vector_similarity_weight),
            top_n: retrieval.top_n.unwrap_or(self.top_n),
            top_k: retrieval.top_k.unwrap_or(self.top_k),
            rerank_id: retrieval
                .rerank_id
                .unwrap_or_else(|| self.rerank_id.clone()),
            kb_ids: patch.kb_ids.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{DecodedPrompt, RetrievalDraft};

    fn patch(name: &str) -> DialogPatch {
        DialogPatch {
            name: Some(name.to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn empty_draft_yields_template_prompt() {
        let template = DefaultTemplate::global();
        let prompt = template.assemble_prompt(PromptDraft::default());
        assert_eq!(prompt, template.prompt);
        assert!(prompt.system.contains("{knowledge}"));
    }

    #[test]
    fn empty_system_falls_back_but_empty_prologue_is_kept() {
        let draft = PromptDraft {
            system: Some(String::new()),
            prologue: Some(String::new()),
            quote: Some(false),
            ..Default::default()
        };

        let prompt = DefaultTemplate::global().assemble_prompt(draft);
        assert_eq!(prompt.system, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(prompt.prologue, "");
        assert!(!prompt.quote);
    }

    #[test]
    fn supplied_empty_parameters_are_kept() {
        let draft = PromptDraft {
            parameters: Some(Vec::new()),
            ..Default::default()
        };
        let prompt = DefaultTemplate::global().assemble_prompt(draft);
        assert!(prompt.parameters.is_empty());
    }

    #[test]
    fn assemble_applies_top_level_defaults() {
        let dialog = DefaultTemplate::global()
            .assemble(Uuid::now_v7(), Uuid::now_v7(), patch("support"), "chat@Factory")
            .unwrap();

        assert_eq!(dialog.description, "A helpful Assistant");
        assert_eq!(dialog.top_n, 6);
        assert_eq!(dialog.top_k, 1024);
        assert_eq!(dialog.rerank_id, "");
        assert_eq!(dialog.llm_id, "chat@Factory");
        assert!(dialog.kb_ids.is_empty());
    }

    #[test]
    fn assemble_keeps_hoisted_retrieval_settings() {
        let mut request = patch("support");
        request.prompt = Some(DecodedPrompt {
            config: PromptDraft::default(),
            retrieval: RetrievalDraft {
                top_n: Some(2),
                rerank_id: Some("rr".into()),
                ..Default::default()
            },
        });

        let dialog = DefaultTemplate::global()
            .assemble(Uuid::now_v7(), Uuid::now_v7(), request, "chat")
            .unwrap();
        assert_eq!(dialog.top_n, 2);
        assert_eq!(dialog.rerank_id, "rr");
        assert_eq!(dialog.top_k, 1024);
    }

    #[test]
    fn assemble_requires_name() {
        let error = DefaultTemplate::global()
            .assemble(Uuid::now_v7(), Uuid::now_v7(), patch(""), "chat")
            .unwrap_err();
        assert_eq!(error.message(), "`name` is required.");

        let error = DefaultTemplate::global()
            .assemble(Uuid::now_v7(), Uuid::now_v7(), DialogPatch::default(), "chat")
            .unwrap_err();
        assert_eq!(error.message(), "`name` is required.");
    }

    #[test]
    fn assemble_rejects_whitespace_and_overlong_names() {
        let template = DefaultTemplate::global();
        assert!(template.assemble(Uuid::now_v7(), Uuid::now_v7(), patch("  \t "), "chat").is_err());

        let long = "x".repeat(crate::dialog::MAX_NAME_LENGTH + 1);
        let error = template
            .assemble(Uuid::now_v7(), Uuid::now_v7(), patch(&long), "chat")
            .unwrap_err();
        assert!(error.message().contains("at most 255"));
    }
}
