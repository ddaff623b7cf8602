//! Translation between the external chat representation and [`DialogConfig`].
//!
//! The external prompt object still uses a set of legacy field names and
//! carries retrieval settings that are stored as top-level dialog columns.
//! [`PromptField`] is the single rename table; [`decode_prompt`] and
//! [`encode_prompt`] apply it in opposite directions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::model::{DecodedPrompt, DialogConfig, LlmSetting, PromptDraft, RetrievalDraft};
use super::patch::DialogPatch;
use crate::{Error, Result};

/// Prompt keys hoisted out of the external prompt object into dialog columns.
pub const HOISTED_KEYS: [&str; 5] = [
    "similarity_threshold",
    "vector_similarity_weight",
    "top_n",
    "rerank_id",
    "top_k",
];

/// Prompt fields whose external name differs from the stored name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptField {
    Parameters,
    Prologue,
    Quote,
    System,
    RerankId,
    VectorSimilarityWeight,
}

impl PromptField {
    pub const ALL: [PromptField; 6] = [
        PromptField::Parameters,
        PromptField::Prologue,
        PromptField::Quote,
        PromptField::System,
        PromptField::RerankId,
        PromptField::VectorSimilarityWeight,
    ];

    /// Stored name of the field.
    pub const fn canonical(self) -> &'static str {
        match self {
            Self::Parameters => "parameters",
            Self::Prologue => "prologue",
            Self::Quote => "quote",
            Self::System => "system",
            Self::RerankId => "rerank_id",
            Self::VectorSimilarityWeight => "vector_similarity_weight",
        }
    }

    /// External name of the field.
    pub const fn legacy(self) -> &'static str {
        match self {
            Self::Parameters => "variables",
            Self::Prologue => "opener",
            Self::Quote => "show_quote",
            Self::System => "prompt",
            Self::RerankId => "rerank_model",
            Self::VectorSimilarityWeight => "keywords_similarity_weight",
        }
    }

    pub fn from_canonical(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.canonical() == name)
    }

    pub fn from_legacy(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.legacy() == name)
    }
}

/// Model selection and sampling parameters of an incoming chat request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct LlmRequest {
    /// Chat model identifier; the tenant default is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    /// Remaining sampling parameters, kept verbatim.
    #[serde(flatten)]
    pub setting: LlmSetting,
}

/// Create or update request body in the external representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ChatRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub llm: Option<LlmRequest>,
    pub dataset_ids: Option<Vec<Uuid>>,
    /// Prompt object, accepting both legacy and stored field names.
    pub prompt: Option<Map<String, Value>>,
    pub avatar: Option<String>,
    /// Rejected when present; the owning tenant comes from authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Value>,
}

/// Chat assistant in the external representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ChatRepresentation {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: String,
    pub avatar: String,
    /// Sampling parameters plus `model_name`.
    pub llm: Map<String, Value>,
    pub dataset_ids: Vec<Uuid>,
    /// Prompt object using legacy field names.
    pub prompt: Map<String, Value>,
}

/// Decodes an external prompt object.
///
/// Legacy keys are renamed to their stored names; when both spellings are
/// present the legacy value wins. Retrieval settings are then hoisted out and
/// unknown keys are dropped.
pub fn decode_prompt(mut prompt: Map<String, Value>) -> Result<DecodedPrompt> {
    for field in PromptField::ALL {
        if let Some(value) = prompt.remove(field.legacy()) {
            prompt.insert(field.canonical().to_owned(), value);
        }
    }

    let mut hoisted = Map::new();
    for key in HOISTED_KEYS {
        if let Some(value) = prompt.remove(key) {
            hoisted.insert(key.to_owned(), value);
        }
    }

    let retrieval: RetrievalDraft = serde_json::from_value(Value::Object(hoisted))
        .map_err(|e| invalid_prompt(&e))?;
    let config: PromptDraft =
        serde_json::from_value(Value::Object(prompt)).map_err(|e| invalid_prompt(&e))?;

    Ok(DecodedPrompt { config, retrieval })
}

/// Decodes a create or update request into an allow-listed patch.
pub fn decode_chat(request: ChatRequest) -> Result<DialogPatch> {
    if request.tenant_id.as_ref().is_some_and(is_truthy) {
        return Err(Error::invalid_input().with_message("`tenant_id` must not be provided."));
    }

    let (llm_id, llm_setting) = match request.llm {
        Some(llm) => (llm.model_name, Some(llm.setting)),
        None => (None, None),
    };

    let prompt = request.prompt.map(decode_prompt).transpose()?;

    Ok(DialogPatch {
        name: request.name,
        description: request.description,
        icon: request.avatar,
        llm_id,
        llm_setting,
        prompt,
        kb_ids: request.dataset_ids,
    })
}

/// Encodes the prompt of a stored dialog using legacy field names.
///
/// `keywords_similarity_weight` is derived as `1 - vector_similarity_weight`
/// and is never stored.
pub fn encode_prompt(dialog: &DialogConfig) -> Map<String, Value> {
    let config = &dialog.prompt_config;
    let parameters = config
        .parameters
        .iter()
        .map(|p| serde_json::json!({ "key": p.key, "optional": p.optional }))
        .collect::<Vec<_>>();

    let mut prompt = Map::new();
    let mut put = |key: &str, value: Value| {
        let key = PromptField::from_canonical(key).map_or(key, |field| field.legacy());
        prompt.insert(key.to_owned(), value);
    };

    put("system", config.system.clone().into());
    put("prologue", config.prologue.clone().into());
    put("parameters", Value::Array(parameters));
    put("empty_response", config.empty_response.clone().into());
    put("quote", config.quote.into());
    put("tts", config.tts.into());
    put("refine_multiturn", config.refine_multiturn.into());

    put("similarity_threshold", dialog.similarity_threshold.into());
    put(
        "vector_similarity_weight",
        (1.0 - dialog.vector_similarity_weight).into(),
    );
    put("top_n", dialog.top_n.into());
    put("top_k", dialog.top_k.into());
    put("rerank_id", dialog.rerank_id.clone().into());

    prompt
}

/// Encodes a stored dialog as an external chat representation.
pub fn encode(dialog: &DialogConfig) -> ChatRepresentation {
    let mut llm = dialog.llm_setting.clone();
    llm.insert("model_name".to_owned(), dialog.llm_id.clone().into());

    ChatRepresentation {
        id: dialog.id,
        tenant_id: dialog.tenant_id,
        name: dialog.name.clone(),
        description: dialog.description.clone(),
        avatar: dialog.icon.clone(),
        llm,
        dataset_ids: dialog.kb_ids.clone(),
        prompt: encode_prompt(dialog),
    }
}

fn invalid_prompt(error: &serde_json::Error) -> Error {
    Error::invalid_input().with_message(format!("Invalid `prompt`: {error}"))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(_) => true,
    }
}
