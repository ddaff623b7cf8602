//! Stored and partially-specified dialog configuration types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{Error, Result};

/// Longest accepted dialog name, counted in characters after trimming.
pub const MAX_NAME_LENGTH: usize = 255;

/// Open map of sampling parameters forwarded to the chat model.
///
/// Typical keys are `temperature`, `top_p`, `top_k`, `max_tokens`,
/// `presence_penalty` and `frequency_penalty`, but any key is kept.
pub type LlmSetting = Map<String, Value>;

/// Checks a caller-supplied name against the limits of the stored column.
pub(crate) fn checked_name(name: String) -> Result<String> {
    let length = name.trim().chars().count();
    if length == 0 {
        return Err(Error::invalid_input().with_message("`name` is required."));
    }
    if length > MAX_NAME_LENGTH {
        return Err(Error::invalid_input()
            .with_message(format!("`name` must be at most {MAX_NAME_LENGTH} characters.")));
    }

    Ok(name)
}

/// A named placeholder substituted into the system template before inference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct PromptParameter {
    /// Placeholder name, referenced as `{key}` in the system template.
    pub key: String,
    /// Optional parameters may be absent from the system template.
    #[serde(default)]
    pub optional: bool,
}

impl PromptParameter {
    /// Creates a required parameter.
    pub fn required(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            optional: false,
        }
    }

    /// Creates an optional parameter.
    pub fn optional(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            optional: true,
        }
    }

    /// Returns the literal placeholder, e.g. `{knowledge}`.
    pub fn placeholder(&self) -> String {
        format!("{{{}}}", self.key)
    }
}

/// Fully assembled prompt configuration, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct PromptConfig {
    pub system: String,
    pub prologue: String,
    pub parameters: Vec<PromptParameter>,
    pub empty_response: String,
    pub quote: bool,
    pub tts: bool,
    pub refine_multiturn: bool,
}

/// Prompt configuration where every field may be absent.
///
/// Produced by decoding caller input; turned into a [`PromptConfig`] by the
/// default template or by merging onto an existing configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct PromptDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prologue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<PromptParameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tts: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refine_multiturn: Option<bool>,
}

impl PromptDraft {
    /// Overlays the supplied fields onto `base`, keeping `base` elsewhere.
    pub fn merged_onto(self, base: &PromptConfig) -> PromptDraft {
        PromptDraft {
            system: self.system.or_else(|| Some(base.system.clone())),
            prologue: self.prologue.or_else(|| Some(base.prologue.clone())),
            parameters: self.parameters.or_else(|| Some(base.parameters.clone())),
            empty_response: self
                .empty_response
                .or_else(|| Some(base.empty_response.clone())),
            quote: self.quote.or(Some(base.quote)),
            tts: self.tts.or(Some(base.tts)),
            refine_multiturn: self.refine_multiturn.or(Some(base.refine_multiturn)),
        }
    }
}

/// Retrieval settings that travel inside the external prompt object but are
/// stored as top-level dialog columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct RetrievalDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_similarity_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerank_id: Option<String>,
}

/// A decoded external prompt object: prompt fields plus hoisted retrieval
/// settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedPrompt {
    pub config: PromptDraft,
    pub retrieval: RetrievalDraft,
}

/// Internal, persisted dialog configuration.
///
/// Owned by the tenant that created it. Lifecycle status and timestamps are
/// tracked by the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct DialogConfig {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Unique per tenant among valid dialogs.
    pub name: String,
    pub description: String,
    pub icon: String,
    /// Chat model identifier.
    pub llm_id: String,
    pub llm_setting: LlmSetting,
    pub prompt_config: PromptConfig,
    pub similarity_threshold: f64,
    pub vector_similarity_weight: f64,
    pub top_n: i32,
    pub top_k: i32,
    /// Rerank model identifier, empty when reranking is disabled.
    pub rerank_id: String,
    /// Knowledge bases in caller order.
    pub kb_ids: Vec<Uuid>,
}

impl DialogConfig {
    /// Returns the rerank model identifier, if reranking is enabled.
    pub fn rerank_model(&self) -> Option<&str> {
        Some(self.rerank_id.as_str()).filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_prompt() -> PromptConfig {
        PromptConfig {
            system: "Use {knowledge}.".into(),
            prologue: "Hello".into(),
            parameters: vec![PromptParameter::required("knowledge")],
            empty_response: "Nothing".into(),
            quote: true,
            tts: false,
            refine_multiturn: true,
        }
    }

    #[test]
    fn placeholder_wraps_key_in_braces() {
        assert_eq!(PromptParameter::required("history").placeholder(), "{history}");
    }

    #[test]
    fn parameter_optional_defaults_to_false() {
        let parameter: PromptParameter = serde_json::from_str(r#"{"key":"knowledge"}"#).unwrap();
        assert!(!parameter.optional);
    }

    #[test]
    fn merged_onto_keeps_base_for_absent_fields() {
        let draft = PromptDraft {
            prologue: Some("Hi there".into()),
            tts: Some(true),
            ..Default::default()
        };

        let merged = draft.merged_onto(&base_prompt());
        assert_eq!(merged.prologue.as_deref(), Some("Hi there"));
        assert_eq!(merged.tts, Some(true));
        assert_eq!(merged.system.as_deref(), Some("Use {knowledge}."));
        assert_eq!(merged.quote, Some(true));
    }
}
