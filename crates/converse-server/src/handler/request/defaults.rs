use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/v1/defaults`.
#[must_use]
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, Validate)]
pub struct UpdateDefaults {
    /// Embedding model for new knowledge bases, `name` or `name@factory`.
    #[validate(length(min = 1, message = "`embedding_model` is required."))]
    pub embedding_model: String,
    /// Chat model used by chats created without one.
    #[validate(length(min = 1, message = "`chat_model` is required."))]
    pub chat_model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_models_are_required() {
        let body: UpdateDefaults =
            serde_json::from_str(r#"{"embedding_model":"bge@BAAI","chat_model":"qwen"}"#).unwrap();
        assert!(body.validate().is_ok());

        let body = UpdateDefaults {
            chat_model: String::new(),
            ..body
        };
        assert!(body.validate().is_err());
        assert!(serde_json::from_str::<UpdateDefaults>(r#"{"chat_model":"qwen"}"#).is_err());
    }
}
