//! OpenAI-compatible chat completions against a stored dialog.
//!
//! Streamed completions are sent as Server-Sent Events, one `data:` event per
//! chunk and a closing `data: [DONE]` once the usage chunk went out. Closing
//! the connection drops the event stream, which cancels generation.
//!
//! A history without user or assistant messages is answered without the
//! engine; that answer comes back inside the success envelope. Engine answers
//! to `stream: false` are the bare `chat.completion` object.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use converse_inference::types::{ChatCompletionChunk, CompletionRequest};
use converse_inference::{
    CompletionAdapter, CompletionAnswer, CompletionContext, CompletionOutcome,
};
use converse_postgres::query::DialogRepository;
use futures::{Stream, StreamExt};

use super::chats::dialog_config;
use crate::extract::{AuthState, Json, Path, PgPool};
use crate::handler::request::AgentPathParams;
use crate::handler::response::Envelope;
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for completion operations.
const TRACING_TARGET: &str = "converse_server::handler::completions";

/// Terminal SSE payload sent after the usage chunk.
const DONE_MARKER: &str = "[DONE]";

/// Answers a conversation with the given agent.
#[tracing::instrument(
    skip_all,
    fields(
        tenant_id = %auth_state.tenant_id(),
        agent_id = %path_params.agent_id,
        stream = request.stream,
    )
)]
async fn chat_completions(
    auth_state: AuthState,
    PgPool(mut conn): PgPool,
    State(adapter): State<CompletionAdapter>,
    Path(path_params): Path<AgentPathParams>,
    Json(request): Json<CompletionRequest>,
) -> Result<Response> {
    if request.messages.is_empty() {
        return Err(ErrorKind::BadRequest.with_message("You must provide at least one message."));
    }

    let agent_id = path_params.agent_id;
    let dialog = conn
        .find_tenant_dialog(auth_state.tenant_id(), agent_id)
        .await?
        .ok_or_else(|| {
            ErrorKind::Forbidden.with_message(format!("You don't own the agent {agent_id}"))
        })?;
    drop(conn);

    let context = CompletionContext {
        tenant_id: auth_state.tenant_id(),
        dialog: Arc::new(dialog_config(dialog)?),
    };

    tracing::debug!(
        target: TRACING_TARGET,
        messages = request.messages.len(),
        "Starting completion"
    );

    if !request.stream {
        let answer = adapter.complete(context, request).await?;
        tracing::info!(
            target: TRACING_TARGET,
            total_tokens = answer.completion().usage.total_tokens,
            synthetic = answer.is_synthetic(),
            "Completion finished"
        );
        return Ok(answer_response(answer));
    }

    match adapter.stream(context, request).await? {
        CompletionOutcome::Synthetic(completion) => {
            Ok(answer_response(CompletionAnswer::Synthetic(completion)))
        }
        CompletionOutcome::Streaming(chunks) => Ok(sse_response(chunks).into_response()),
    }
}

/// Envelopes synthetic answers; engine answers stay bare.
fn answer_response(answer: CompletionAnswer) -> Response {
    match answer {
        CompletionAnswer::Synthetic(completion) => Envelope::new(completion).into_response(),
        CompletionAnswer::Generated(completion) => Json(completion).into_response(),
    }
}

/// Frames completion chunks as SSE events.
///
/// An error item ends the stream without the done marker.
fn sse_response<S>(chunks: S) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    S: Stream<Item = converse_core::Result<ChatCompletionChunk>> + Send + 'static,
{
    let events = async_stream::stream! {
        let mut chunks = Box::pin(chunks);
        while let Some(item) = chunks.next().await {
            let chunk = match item {
                Ok(chunk) => chunk,
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        error = %error,
                        "Closing completion stream after engine failure"
                    );
                    break;
                }
            };

            let is_final = chunk.is_final();
            match Event::default().json_data(&chunk) {
                Ok(event) => yield Ok(event),
                Err(error) => {
                    tracing::error!(
                        target: TRACING_TARGET,
                        error = %error,
                        "Failed to serialize completion chunk"
                    );
                    break;
                }
            }

            if is_final {
                yield Ok(Event::default().data(DONE_MARKER));
                break;
            }
        }
    };

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Returns the completions route.
///
/// Registered as a plain axum route: SSE bodies have no OpenAPI schema.
pub fn routes() -> aide::axum::ApiRouter<ServiceState> {
    use axum::routing::post;

    aide::axum::ApiRouter::new().route(
        "/api/v1/agents_openai/{agent_id}/chat/completions",
        post(chat_completions),
    )
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::HeaderValue;
    use axum::http::header::CONTENT_TYPE;
    use axum::routing::get;
    use axum::extract::FromRef;
    use axum_test::TestServer;
    use converse_core::Error;
    use converse_core::dialog::{DefaultTemplate, DialogPatch};
    use converse_inference::types::CompletionMessage;
    use uuid::Uuid;
    use futures::stream;
    use serde_json::json;

    use super::*;
    use crate::handler::test::{create_test_server_with_router, test_state};

    fn chunk(content: Option<&str>, last: bool) -> ChatCompletionChunk {
        let delta = match content {
            Some(content) => json!({"content": content}),
            None => json!({}),
        };
        let mut value = json!({
            "id": "chat",
            "object": "chat.completion.chunk",
            "created": 1,
            "model": "m",
            "choices": [{
                "index": 0,
                "delta": delta,
                "finish_reason": if last { json!("stop") } else { json!(null) },
            }],
        });
        if last {
            value["usage"] = json!({"prompt_tokens": 1, "completion_tokens": 2, "total_tokens": 3});
        }
        serde_json::from_value(value).unwrap()
    }

    fn data_lines(body: &str) -> Vec<&str> {
        body.lines()
            .filter_map(|line| line.strip_prefix("data: "))
            .collect()
    }

    type Script = fn() -> Vec<converse_core::Result<ChatCompletionChunk>>;

    fn sse_server(script: Script) -> TestServer {
        let app = Router::new().route(
            "/events",
            get(move || async move { sse_response(stream::iter(script())) }),
        );
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn done_follows_the_usage_chunk() -> anyhow::Result<()> {
        let server = sse_server(|| {
            vec![
                Ok(chunk(Some("Hel"), false)),
                Ok(chunk(Some("lo"), false)),
                Ok(chunk(None, true)),
            ]
        });

        let response = server.get("/events").await;
        response.assert_status_ok();
        response.assert_header(CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));

        let body = response.text();
        let events = data_lines(&body);
        assert_eq!(events.len(), 4);
        assert_eq!(events.last(), Some(&DONE_MARKER));

        let last: serde_json::Value = serde_json::from_str(events[2])?;
        assert_eq!(last["usage"]["total_tokens"], 3);
        assert_eq!(last["choices"][0]["finish_reason"], "stop");

        Ok(())
    }

    #[tokio::test]
    async fn engine_failure_closes_without_done() -> anyhow::Result<()> {
        let server = sse_server(|| {
            vec![
                Ok(chunk(Some("partial"), false)),
                Err(Error::external_error().with_message("engine went away")),
                Ok(chunk(None, true)),
            ]
        });

        let body = server.get("/events").await.text();
        let events = data_lines(&body);
        assert_eq!(events.len(), 1);
        assert!(!body.contains(DONE_MARKER));

        Ok(())
    }

    #[tokio::test]
    async fn completions_require_a_token() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes())?;

        let response = server
            .post("/api/v1/agents_openai/0190a6f5-2c1e-7a4b-9a57-3c9f1e2d4b6a/chat/completions")
            .json(&json!({"model": "m", "messages": []}))
            .await;
        response.assert_status_unauthorized();
        response.assert_json(&json!({
            "code": 109,
            "message": "Authorization is not valid!",
            "data": null,
        }));

        Ok(())
    }

    async fn answer(messages: Vec<CompletionMessage>) -> anyhow::Result<CompletionAnswer> {
        let adapter = CompletionAdapter::from_ref(&test_state()?);
        let patch = DialogPatch {
            name: Some("support".into()),
            ..Default::default()
        };
        let dialog = DefaultTemplate::global().assemble(
            Uuid::now_v7(),
            Uuid::now_v7(),
            patch,
            "chat",
        )?;
        let context = CompletionContext {
            tenant_id: dialog.tenant_id,
            dialog: Arc::new(dialog),
        };

        let request = CompletionRequest::new("m", messages).with_stream(false);
        Ok(adapter.complete(context, request).await?)
    }

    #[tokio::test]
    async fn synthetic_answers_are_enveloped() -> anyhow::Result<()> {
        let answer = answer(vec![CompletionMessage::system("x")]).await?;
        let app = Router::new().route("/", get(move || async move { answer_response(answer) }));
        let server = TestServer::new(app)?;

        let body = server.get("/").await.json::<serde_json::Value>();
        assert_eq!(body["code"], 0);
        assert_eq!(body["message"], "success");
        assert_eq!(body["data"]["object"], "chat.completion");
        assert_eq!(
            body["data"]["choices"][0]["message"]["content"],
            converse_inference::NO_VALID_MESSAGES
        );

        Ok(())
    }

    #[tokio::test]
    async fn engine_answers_are_bare() -> anyhow::Result<()> {
        let answer = answer(vec![CompletionMessage::user("hi")]).await?;
        let app = Router::new().route("/", get(move || async move { answer_response(answer) }));
        let server = TestServer::new(app)?;

        let body = server.get("/").await.json::<serde_json::Value>();
        assert_eq!(body["object"], "chat.completion");
        assert_eq!(body["choices"][0]["message"]["content"], "Hello world");
        assert!(body.get("code").is_none());

        Ok(())
    }
}
