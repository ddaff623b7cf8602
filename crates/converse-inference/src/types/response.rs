#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{CompletionMessage, Role};

const CHUNK_OBJECT: &str = "chat.completion.chunk";
const COMPLETION_OBJECT: &str = "chat.completion";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
}

/// Token accounting. `total_tokens` is always the sum of the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

impl Usage {
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Incremental message content carried by a chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Delta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ChunkChoice {
    pub index: u32,
    pub delta: Delta,
    pub finish_reason: Option<FinishReason>,
}

/// One `chat.completion.chunk` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: String,
    /// Unix seconds, fixed for the whole stream.
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChunkChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatCompletionChunk {
    pub(crate) fn delta(id: &str, created: i64, model: &str, delta: Delta) -> Self {
        Self {
            id: id.to_owned(),
            object: CHUNK_OBJECT.to_owned(),
            created,
            model: model.to_owned(),
            choices: vec![ChunkChoice {
                index: 0,
                delta,
                finish_reason: None,
            }],
            usage: None,
        }
    }

    pub(crate) fn last(id: &str, created: i64, model: &str, usage: Usage) -> Self {
        Self {
            id: id.to_owned(),
            object: CHUNK_OBJECT.to_owned(),
            created,
            model: model.to_owned(),
            choices: vec![ChunkChoice {
                index: 0,
                delta: Delta::default(),
                finish_reason: Some(FinishReason::Stop),
            }],
            usage: Some(usage),
        }
    }

    /// Returns the text this chunk adds, if any.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
    }

    /// Returns `true` for the usage-bearing chunk that ends a stream.
    pub fn is_final(&self) -> bool {
        self.usage.is_some()
            && self
                .choices
                .first()
                .is_some_and(|choice| choice.finish_reason == Some(FinishReason::Stop))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CompletionChoice {
    pub index: u32,
    pub message: CompletionMessage,
    pub finish_reason: FinishReason,
}

/// A complete, non-streamed `chat.completion` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ChatCompletion {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<CompletionChoice>,
    pub usage: Usage,
}

impl ChatCompletion {
    pub(crate) fn new(id: &str, created: i64, model: &str, content: String, usage: Usage) -> Self {
        Self {
            id: id.to_owned(),
            object: COMPLETION_OBJECT.to_owned(),
            created,
            model: model.to_owned(),
            choices: vec![CompletionChoice {
                index: 0,
                message: CompletionMessage::assistant(content),
                finish_reason: FinishReason::Stop,
            }],
            usage,
        }
    }

    /// Returns the assistant's answer.
    pub fn content(&self) -> &str {
        self.choices
            .first()
            .map_or("", |choice| choice.message.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn delta_chunk_wire_shape() {
        let delta = Delta {
            role: Some(Role::Assistant),
            content: Some("Hel".into()),
        };
        let chunk = ChatCompletionChunk::delta("d1", 1_700_000_000, "gpt", delta);

        assert_eq!(
            serde_json::to_value(&chunk).unwrap(),
            json!({
                "id": "d1",
                "object": "chat.completion.chunk",
                "created": 1_700_000_000,
                "model": "gpt",
                "choices": [{
                    "index": 0,
                    "delta": {"role": "assistant", "content": "Hel"},
                    "finish_reason": null
                }]
            })
        );
        assert!(!chunk.is_final());
    }

    #[test]
    fn final_chunk_carries_usage_and_empty_delta() {
        let chunk = ChatCompletionChunk::last("d1", 1, "gpt", Usage::new(3, 4));
        let value = serde_json::to_value(&chunk).unwrap();

        assert_eq!(value["choices"][0]["delta"], json!({}));
        assert_eq!(value["choices"][0]["finish_reason"], "stop");
        assert_eq!(value["usage"]["total_tokens"], 7);
        assert!(chunk.is_final());
        assert_eq!(chunk.content(), None);
    }

    #[test]
    fn completion_wire_shape() {
        let completion = ChatCompletion::new("d1", 1, "gpt", "Hi".into(), Usage::new(1, 1));
        let value = serde_json::to_value(&completion).unwrap();

        assert_eq!(value["object"], "chat.completion");
        assert_eq!(
            value["choices"][0]["message"],
            json!({"role": "assistant", "content": "Hi"})
        );
        assert_eq!(value["choices"][0]["finish_reason"], "stop");
    }
}
