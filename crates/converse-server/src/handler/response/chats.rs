//! Chat assistant response types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use converse_core::dialog::ChatRepresentation as Chat;

/// One page of the caller's chat assistants, in the requested order.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Chats {
    /// Number of chats matching the filters across all pages.
    pub total: i64,
    pub chats: Vec<Chat>,
}

/// Ids removed by a delete request.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DeletedChats {
    pub delete_ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_carries_the_total() {
        let value = serde_json::to_value(Chats {
            total: 42,
            chats: Vec::new(),
        })
        .unwrap();
        assert_eq!(value, serde_json::json!({"total": 42, "chats": []}));
    }
}
