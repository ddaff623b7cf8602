#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::CompletionMessage;

/// Body of an OpenAI-style chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CompletionRequest {
    /// Echoed back in every response; any value is accepted.
    pub model: String,
    pub messages: Vec<CompletionMessage>,
    #[serde(default = "default_stream")]
    pub stream: bool,
    /// Conversation session forwarded to the engine.
    #[serde(default)]
    pub id: Option<String>,
}

fn default_stream() -> bool {
    true
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<CompletionMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: default_stream(),
            id: None,
        }
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.id = Some(session_id.into());
        self
    }

    /// Returns the content of the last `user` message, or an empty string.
    pub fn question(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == super::Role::User)
            .map_or("", |message| message.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_defaults_to_true() {
        let request: CompletionRequest =
            serde_json::from_str(r#"{"model":"m","messages":[]}"#).unwrap();
        assert!(request.stream);
        assert_eq!(request.id, None);
    }

    #[test]
    fn question_is_last_user_message() {
        let request = CompletionRequest::new(
            "m",
            vec![
                CompletionMessage::user("first"),
                CompletionMessage::assistant("answer"),
                CompletionMessage::user("second"),
                CompletionMessage::system("be brief"),
            ],
        );
        assert_eq!(request.question(), "second");

        let request = CompletionRequest::new("m", vec![CompletionMessage::assistant("hi")]);
        assert_eq!(request.question(), "");
    }
}
