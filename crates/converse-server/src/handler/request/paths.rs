use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `/api/v1/chats/{chat_id}`
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ChatPathParams {
    /// Chat assistant (dialog) id.
    pub chat_id: Uuid,
}

/// `/api/v1/agents_openai/{agent_id}/chat/completions`
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AgentPathParams {
    /// Dialog id the completion runs against.
    pub agent_id: Uuid,
}
