use converse_inference::engine::{EngineClient, EngineConfig};
use converse_inference::{CompletionAdapter, Cl100kTokenizer, InferenceService};
use converse_postgres::{PgClient, PgClientExt, PgConfig};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::service::{Error, Result, TRACING_TARGET_SERVICE};

/// Default values for configuration options.
mod defaults {
    /// Chunks buffered between the engine task and the SSE body.
    pub const COMPLETION_CHANNEL_CAPACITY: usize = 32;

    pub fn completion_channel_capacity() -> usize {
        COMPLETION_CHANNEL_CAPACITY
    }
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(clap::Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct ServiceConfig {
    #[cfg_attr(feature = "config", command(flatten))]
    pub postgres: PgConfig,

    #[cfg_attr(feature = "config", command(flatten))]
    pub engine: EngineConfig,

    /// Completion chunks buffered per streaming request
    #[cfg_attr(
        feature = "config",
        arg(
            long = "completion-channel-capacity",
            env = "COMPLETION_CHANNEL_CAPACITY",
            default_value_t = defaults::COMPLETION_CHANNEL_CAPACITY
        )
    )]
    #[builder(default = "defaults::COMPLETION_CHANNEL_CAPACITY")]
    #[serde(default = "defaults::completion_channel_capacity")]
    pub completion_channel_capacity: usize,
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Creates the connection pool and applies pending migrations.
    pub async fn connect_postgres(&self) -> Result<PgClient> {
        let pg_client = self.postgres.clone().build().map_err(|e| {
            Error::configuration()
                .with_message("Failed to create database client")
                .with_source(e)
        })?;

        let migrations = pg_client.run_pending_migrations().await.map_err(|e| {
            Error::internal_error()
                .with_message("Failed to apply database migrations")
                .with_source(e)
        })?;

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            applied = migrations.processed_versions.len(),
            duration = ?migrations.duration,
            "Database migrations applied"
        );

        Ok(pg_client)
    }

    /// Creates the HTTP client for the inference engine.
    pub fn connect_inference(&self) -> Result<InferenceService> {
        let client = EngineClient::new(self.engine.clone())?;
        Ok(client.into_service())
    }

    /// Wraps `inference` in a completion adapter counting cl100k tokens.
    pub fn completion_adapter(&self, inference: InferenceService) -> Result<CompletionAdapter> {
        let tokenizer = Cl100kTokenizer::new()?;
        Ok(CompletionAdapter::new(inference, tokenizer)
            .with_channel_capacity(self.completion_channel_capacity))
    }
}

impl ServiceConfigBuilder {
    fn validate(builder: &ServiceConfigBuilder) -> Result<(), String> {
        if let Some(postgres) = &builder.postgres {
            postgres.validate().map_err(|e| e.to_string())?;
        }

        if let Some(engine) = &builder.engine
            && !matches!(engine.engine_url.scheme(), "http" | "https")
        {
            return Err("Engine URL must use http or https".to_owned());
        }

        if let Some(capacity) = builder.completion_channel_capacity {
            if capacity == 0 {
                return Err("Completion channel capacity must be greater than 0".to_owned());
            }
            if capacity > 4096 {
                return Err("Completion channel capacity cannot exceed 4096".to_owned());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> EngineConfig {
        EngineConfig::new("http://127.0.0.1:9380".parse().unwrap())
    }

    #[test]
    fn builder_applies_defaults() {
        let config = ServiceConfig::builder()
            .with_postgres(PgConfig::new("postgresql://converse@localhost/converse"))
            .with_engine(engine())
            .build()
            .unwrap();
        assert_eq!(config.completion_channel_capacity, 32);
    }

    #[test]
    fn builder_rejects_zero_capacity() {
        let result = ServiceConfig::builder()
            .with_postgres(PgConfig::new("postgresql://converse@localhost/converse"))
            .with_engine(engine())
            .with_completion_channel_capacity(0usize)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_rejects_non_http_engine() {
        let result = ServiceConfig::builder()
            .with_postgres(PgConfig::new("postgresql://converse@localhost/converse"))
            .with_engine(EngineConfig::new("ftp://engine".parse().unwrap()))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_requires_postgres() {
        assert!(ServiceConfig::builder().with_engine(engine()).build().is_err());
    }
}
