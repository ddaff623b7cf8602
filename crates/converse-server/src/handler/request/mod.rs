//! Request payloads and query/path parameters.

mod chats;
mod defaults;
mod paths;

pub use self::chats::{DeleteChats, ListChats};
pub use self::defaults::UpdateDefaults;
pub use self::paths::{AgentPathParams, ChatPathParams};
pub use converse_core::dialog::ChatRequest as CreateChat;
pub use converse_core::dialog::ChatRequest as UpdateChat;
