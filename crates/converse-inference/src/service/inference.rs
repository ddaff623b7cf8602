use std::fmt;
use std::sync::Arc;

use converse_core::{Result, ServiceHealth};
use jiff::Timestamp;

use super::{DeltaStream, GenerationRequest, InferenceProvider};
use crate::TRACING_TARGET;

/// Cloneable handle to an [`InferenceProvider`] with structured logging.
#[derive(Clone)]
pub struct InferenceService {
    provider: Arc<dyn InferenceProvider>,
}

impl fmt::Debug for InferenceService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceService").finish_non_exhaustive()
    }
}

impl InferenceService {
    pub fn new<P>(provider: P) -> Self
    where
        P: InferenceProvider + 'static,
    {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Starts generation. The elapsed time covers only the engine's time to
    /// accept the request, not the whole answer.
    pub async fn generate(&self, request: GenerationRequest) -> Result<DeltaStream> {
        let started_at = Timestamp::now();
        let dialog_id = request.dialog.id;
        let tenant_id = request.tenant_id;

        tracing::debug!(
            target: TRACING_TARGET,
            %dialog_id,
            %tenant_id,
            stream = request.stream,
            question_len = request.question.len(),
            "Starting generation"
        );

        let result = self.provider.generate(request).await;
        let elapsed = Timestamp::now().duration_since(started_at);

        match &result {
            Ok(_) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    %dialog_id,
                    elapsed_ms = elapsed.as_millis(),
                    "Generation accepted"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    %dialog_id,
                    %tenant_id,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Generation failed to start"
                );
            }
        }

        result
    }

    pub async fn health_check(&self) -> Result<ServiceHealth> {
        let started_at = Timestamp::now();
        let result = self.provider.health_check().await;
        let elapsed = Timestamp::now().duration_since(started_at);

        if let Err(error) = &result {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "Inference health check failed"
            );
        }

        result
    }
}
