use converse_inference::{CompletionAdapter, InferenceService};
use converse_postgres::PgClient;

use crate::service::{Result, ServiceConfig};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    pg_client: PgClient,
    inference: InferenceService,
    completion: CompletionAdapter,
}

impl ServiceState {
    /// Connects to Postgres and the inference engine.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let pg_client = config.connect_postgres().await?;
        let inference = config.connect_inference()?;
        let completion = config.completion_adapter(inference.clone())?;

        Ok(Self::from_parts(pg_client, inference, completion))
    }

    /// Assembles state from already constructed services.
    pub fn from_parts(
        pg_client: PgClient,
        inference: InferenceService,
        completion: CompletionAdapter,
    ) -> Self {
        Self {
            pg_client,
            inference,
            completion,
        }
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(pg_client: PgClient);
impl_di!(inference: InferenceService);
impl_di!(completion: CompletionAdapter);
