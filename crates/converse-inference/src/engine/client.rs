//! Reqwest-based client streaming deltas from the inference engine.

use std::io;
use std::sync::Arc;

use bytes::Bytes;
use converse_core::dialog::DialogConfig;
use futures_util::{Stream, StreamExt, TryStreamExt};
use jiff::Timestamp;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;
use url::Url;
use uuid::Uuid;

use super::{EngineConfig, Error, TRACING_TARGET};
use crate::{DeltaStream, GenerationRequest, InferenceProvider, InferenceService, ServiceHealth};

/// Longest accepted response line.
const MAX_LINE_LENGTH: usize = 1 << 20;

struct EngineClientInner {
    http: Client,
    config: EngineConfig,
}

/// HTTP client for the inference engine.
///
/// Implements [`InferenceProvider`]; dropping the returned [`DeltaStream`]
/// drops the response body and with it the connection.
#[derive(Clone)]
pub struct EngineClient {
    inner: Arc<EngineClientInner>,
}

impl std::fmt::Debug for EngineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    tenant_id: Uuid,
    dialog: &'a DialogConfig,
    question: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
    stream: bool,
}

#[derive(Deserialize)]
struct EngineLine {
    #[serde(default)]
    delta: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl EngineClient {
    pub fn new(config: EngineConfig) -> crate::Result<Self> {
        let read_timeout = config.timeout();
        let connect_timeout = config.connect_timeout();

        tracing::debug!(
            target: TRACING_TARGET,
            engine_url = %config.engine_url,
            read_timeout_ms = read_timeout.as_millis(),
            connect_timeout_ms = connect_timeout.as_millis(),
            "Creating engine client"
        );

        let http = Client::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .user_agent(EngineConfig::user_agent())
            .build()
            .map_err(Error::from)?;

        Ok(Self {
            inner: Arc::new(EngineClientInner { http, config }),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn into_service(self) -> InferenceService {
        InferenceService::new(self)
    }

    /// Appends `path` to the base URL, keeping any base path.
    fn endpoint(&self, path: &str) -> crate::Result<Url> {
        let mut url = self.inner.config.engine_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                crate::Error::configuration()
                    .with_message("Engine URL cannot be used as a base URL")
            })?
            .pop_if_empty()
            .extend(path.split('/'));
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.inner.config.engine_api_key {
            Some(api_key) => request.bearer_auth(api_key),
            None => request,
        }
    }
}

/// Parses one response line. Blank lines and lines without content yield
/// `None`.
fn parse_line(line: &str) -> Option<crate::Result<String>> {
    if line.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<EngineLine>(line) {
        Ok(EngineLine {
            error: Some(message),
            ..
        }) => Some(Err(crate::Error::external_error().with_message(message))),
        Ok(EngineLine { delta, .. }) => delta.map(Ok),
        Err(error) => Some(Err(Error::from(error).into())),
    }
}

/// Splits a byte stream into deltas, one JSON object per line.
fn decode_lines<S>(body: S) -> DeltaStream
where
    S: Stream<Item = io::Result<Bytes>> + Send + Unpin + 'static,
{
    FramedRead::new(
        StreamReader::new(body),
        LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
    )
    .filter_map(|line| async move {
        match line {
            Ok(line) => parse_line(&line),
            Err(error) => Some(Err(Error::from(error).into())),
        }
    })
    .boxed()
}

#[async_trait::async_trait]
impl InferenceProvider for EngineClient {
    async fn generate(&self, request: GenerationRequest) -> crate::Result<DeltaStream> {
        let url = self.endpoint("v1/generate")?;
        let body = GenerateBody {
            tenant_id: request.tenant_id,
            dialog: &request.dialog,
            question: &request.question,
            session_id: request.session_id.as_deref(),
            stream: request.stream,
        };

        tracing::debug!(
            target: TRACING_TARGET,
            %url,
            dialog_id = %request.dialog.id,
            "Requesting generation"
        );

        let response = self
            .authorize(self.inner.http.post(url))
            .json(&body)
            .send()
            .await
            .map_err(Error::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status { status, body }.into());
        }

        let body = response.bytes_stream().map_err(io::Error::other);
        Ok(decode_lines(Box::pin(body)))
    }

    async fn health_check(&self) -> crate::Result<ServiceHealth> {
        let started_at = Timestamp::now();
        let url = self.endpoint("health")?;

        let response = self
            .authorize(self.inner.http.get(url))
            .send()
            .await
            .map_err(Error::from)?;
        let elapsed = Timestamp::now().duration_since(started_at);
        let response_time = elapsed.unsigned_abs();

        let health = if response.status().is_success() {
            ServiceHealth::healthy()
        } else {
            ServiceHealth::unhealthy(format!("Engine health returned {}", response.status()))
        };

        Ok(health.with_response_time(response_time))
    }
}

#[cfg(test)]
mod tests {
    use futures_util::stream;

    use super::*;
    use crate::ErrorKind;

    fn client(url: &str) -> EngineClient {
        EngineClient::new(EngineConfig::new(url.parse().unwrap())).unwrap()
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let client = client("http://engine.internal/rag/");
        assert_eq!(
            client.endpoint("v1/generate").unwrap().as_str(),
            "http://engine.internal/rag/v1/generate"
        );

        let client = self::client("http://engine.internal:9380");
        assert_eq!(
            client.endpoint("health").unwrap().as_str(),
            "http://engine.internal:9380/health"
        );
    }

    #[test]
    fn parse_line_variants() {
        assert!(parse_line("   ").is_none());
        assert!(parse_line("{}").is_none());
        assert_eq!(parse_line(r#"{"delta":"Hi"}"#).unwrap().unwrap(), "Hi");

        let error = parse_line(r#"{"error":"out of memory"}"#).unwrap().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ExternalError);
        assert_eq!(error.message(), "out of memory");

        let error = parse_line("not json").unwrap().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Serialization);
    }

    #[tokio::test]
    async fn decode_lines_across_chunk_boundaries() {
        let chunks = vec![
            Ok(Bytes::from_static(b"{\"delta\":\"Hel")),
            Ok(Bytes::from_static(b"lo\"}\n\n{\"delta\":\" world\"}\n")),
            Ok(Bytes::from_static(b"{\"delta\":\"!\"}")),
        ];

        let deltas: Vec<String> = decode_lines(stream::iter(chunks))
            .map(|delta| delta.unwrap())
            .collect()
            .await;
        assert_eq!(deltas, vec!["Hello", " world", "!"]);
    }

    #[tokio::test]
    async fn decode_lines_surfaces_engine_error() {
        let chunks = vec![Ok(Bytes::from_static(
            b"{\"delta\":\"partial\"}\n{\"error\":\"boom\"}\n",
        ))];

        let items: Vec<_> = decode_lines(stream::iter(chunks)).collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
    }
}
