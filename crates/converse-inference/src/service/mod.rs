//! The inference engine seam and its logging wrapper.

mod inference;

use std::sync::Arc;

use converse_core::dialog::DialogConfig;
use converse_core::{Result, ServiceHealth};
use futures_util::stream::BoxStream;
use uuid::Uuid;

pub use self::inference::InferenceService;

/// Text deltas produced by the engine, in order.
///
/// Finite and not restartable. Dropping the stream cancels generation.
pub type DeltaStream = BoxStream<'static, Result<String>>;

/// Everything the engine needs to answer one question.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub tenant_id: Uuid,
    pub dialog: Arc<DialogConfig>,
    pub question: String,
    pub session_id: Option<String>,
    /// Hint that the caller consumes deltas incrementally.
    pub stream: bool,
}

/// A retrieval-augmented generator treated as an opaque delta producer.
#[async_trait::async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Starts generating an answer.
    ///
    /// Errors returned here happen before any delta exists.
    async fn generate(&self, request: GenerationRequest) -> Result<DeltaStream>;

    async fn health_check(&self) -> Result<ServiceHealth>;
}
