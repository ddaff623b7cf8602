//! Response types for HTTP handlers.

mod chats;
mod defaults;
mod envelope;
mod error_response;
mod monitors;

pub use chats::*;
pub use defaults::*;
pub use envelope::*;
pub use error_response::*;
pub use monitors::*;
