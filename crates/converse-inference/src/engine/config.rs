//! Engine client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default idle timeout between reads of an engine response: 120 seconds.
pub const DEFAULT_ENGINE_TIMEOUT_SECS: u64 = 120;

/// Upper bound for establishing a connection to the engine: 10 seconds.
pub const ENGINE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the inference engine.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct EngineConfig {
    /// Base URL of the inference engine
    #[cfg_attr(feature = "config", arg(long = "engine-url", env = "ENGINE_URL"))]
    pub engine_url: Url,

    /// Longest wait in seconds for the next chunk of an engine response
    #[cfg_attr(
        feature = "config",
        arg(long = "engine-timeout", env = "ENGINE_TIMEOUT", default_value = "120")
    )]
    #[serde(default = "default_engine_timeout")]
    pub engine_timeout: u64,

    /// Bearer token sent to the engine
    #[cfg_attr(feature = "config", arg(long = "engine-api-key", env = "ENGINE_API_KEY"))]
    #[serde(default)]
    pub engine_api_key: Option<String>,
}

fn default_engine_timeout() -> u64 {
    DEFAULT_ENGINE_TIMEOUT_SECS
}

impl EngineConfig {
    pub fn new(engine_url: Url) -> Self {
        Self {
            engine_url,
            engine_timeout: default_engine_timeout(),
            engine_api_key: None,
        }
    }

    /// Returns the read timeout, using the default if zero.
    ///
    /// It bounds each wait for response data, not the whole generation, so a
    /// long stream that keeps producing deltas is never cut off.
    pub fn timeout(&self) -> Duration {
        match self.engine_timeout {
            0 => Duration::from_secs(DEFAULT_ENGINE_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    /// Returns the connect timeout, never longer than the read timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(ENGINE_CONNECT_TIMEOUT_SECS).min(self.timeout())
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.engine_timeout = timeout_secs;
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.engine_api_key = Some(api_key.into());
        self
    }

    pub(crate) fn user_agent() -> String {
        format!("converse/{}", env!("CARGO_PKG_VERSION"))
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("engine_url", &self.engine_url.as_str())
            .field("engine_timeout", &self.engine_timeout)
            .field("engine_api_key", &self.engine_api_key.as_ref().map(|_| "****"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EngineConfig {
        EngineConfig::new("http://engine.internal:9380".parse().unwrap())
    }

    #[test]
    fn zero_timeout_uses_default() {
        assert_eq!(config().with_timeout(0).timeout(), Duration::from_secs(120));
        assert_eq!(config().with_timeout(5).timeout(), Duration::from_secs(5));
    }

    #[test]
    fn connect_timeout_is_capped_by_read_timeout() {
        assert_eq!(config().connect_timeout(), Duration::from_secs(10));
        assert_eq!(config().with_timeout(3).connect_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn debug_masks_api_key() {
        let debug = format!("{:?}", config().with_api_key("secret-token"));
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("****"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"engine_url":"http://localhost:9380"}"#).unwrap();
        assert_eq!(config.engine_timeout, DEFAULT_ENGINE_TIMEOUT_SECS);
        assert!(config.engine_api_key.is_none());
    }
}
