use std::fmt;
use std::sync::Arc;

use converse_core::Result;
use converse_core::dialog::DialogConfig;
use futures_util::StreamExt;
use jiff::Timestamp;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::CompletionStream;
use crate::service::{DeltaStream, GenerationRequest, InferenceService};
use crate::tokenizer::Tokenizer;
use crate::types::{
    ChatCompletion, ChatCompletionChunk, CompletionRequest, Delta, Role, Usage,
};
use crate::TRACING_TARGET;

/// Answer returned without calling the engine when no message qualifies.
pub const NO_VALID_MESSAGES: &str = "No valid messages found (user or assistant).";

/// Default number of chunks buffered between producer and consumer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// The resolved dialog a completion runs against.
#[derive(Debug, Clone)]
pub struct CompletionContext {
    pub tenant_id: Uuid,
    pub dialog: Arc<DialogConfig>,
}

/// Result of starting a streamed completion.
#[derive(Debug)]
pub enum CompletionOutcome {
    /// No user or assistant message was supplied; answered without the engine.
    Synthetic(ChatCompletion),
    /// The engine accepted the question and produced its first delta.
    Streaming(CompletionStream),
}

/// Result of a non-streamed completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionAnswer {
    /// No user or assistant message was supplied; answered without the engine.
    Synthetic(ChatCompletion),
    /// Aggregated from the engine's deltas.
    Generated(ChatCompletion),
}

impl CompletionAnswer {
    /// Returns `true` if the engine was not called.
    #[inline]
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic(_))
    }

    pub fn completion(&self) -> &ChatCompletion {
        match self {
            Self::Synthetic(completion) | Self::Generated(completion) => completion,
        }
    }

    pub fn into_completion(self) -> ChatCompletion {
        match self {
            Self::Synthetic(completion) | Self::Generated(completion) => completion,
        }
    }
}

/// Turns a dialog plus message history into OpenAI-compatible completions.
///
/// Prompt tokens are counted over the `user` and `assistant` messages only;
/// completion tokens over the concatenated answer.
#[derive(Clone)]
pub struct CompletionAdapter {
    inference: InferenceService,
    tokenizer: Arc<dyn Tokenizer>,
    channel_capacity: usize,
}

impl fmt::Debug for CompletionAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionAdapter")
            .field("channel_capacity", &self.channel_capacity)
            .finish_non_exhaustive()
    }
}

/// Running state of one completion.
struct Accumulator {
    id: String,
    created: i64,
    model: String,
    prompt_tokens: usize,
    content: String,
    chunks: usize,
    tokenizer: Arc<dyn Tokenizer>,
}

impl Accumulator {
    fn append(&mut self, delta: &str) {
        self.content.push_str(delta);
        self.chunks += 1;
    }

    /// Records a delta and returns it as a chunk. Only the first chunk names
    /// the role.
    fn push(&mut self, delta: String) -> ChatCompletionChunk {
        self.append(&delta);
        let delta = Delta {
            role: (self.chunks == 1).then_some(Role::Assistant),
            content: Some(delta),
        };
        ChatCompletionChunk::delta(&self.id, self.created, &self.model, delta)
    }

    fn usage(&self) -> Usage {
        Usage::new(self.prompt_tokens, self.tokenizer.count(&self.content))
    }

    fn finish(&self) -> ChatCompletionChunk {
        ChatCompletionChunk::last(&self.id, self.created, &self.model, self.usage())
    }

    fn into_completion(self) -> ChatCompletion {
        let usage = self.usage();
        ChatCompletion::new(&self.id, self.created, &self.model, self.content, usage)
    }
}

enum Prepared {
    Synthetic(ChatCompletion),
    Generate(GenerationRequest, Accumulator),
}

impl CompletionAdapter {
    pub fn new<T>(inference: InferenceService, tokenizer: T) -> Self
    where
        T: Tokenizer + 'static,
    {
        Self {
            inference,
            tokenizer: Arc::new(tokenizer),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Sets how many chunks may queue up before the producer waits.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    fn prepare(
        &self,
        context: CompletionContext,
        request: CompletionRequest,
        stream: bool,
    ) -> Prepared {
        let prompt_tokens = request
            .messages
            .iter()
            .filter(|message| message.role.is_conversational())
            .map(|message| self.tokenizer.count(&message.content))
            .sum();

        let mut accumulator = Accumulator {
            id: context.dialog.id.to_string(),
            created: Timestamp::now().as_second(),
            model: request.model.clone(),
            prompt_tokens,
            content: String::new(),
            chunks: 0,
            tokenizer: Arc::clone(&self.tokenizer),
        };

        let has_conversation = request
            .messages
            .iter()
            .any(|message| message.role.is_conversational());
        if !has_conversation {
            tracing::debug!(
                target: TRACING_TARGET,
                dialog_id = %context.dialog.id,
                "No user or assistant message, answering without the engine"
            );
            accumulator.append(NO_VALID_MESSAGES);
            return Prepared::Synthetic(accumulator.into_completion());
        }

        let generation = GenerationRequest {
            tenant_id: context.tenant_id,
            question: request.question().to_owned(),
            dialog: context.dialog,
            session_id: request.id,
            stream,
        };

        Prepared::Generate(generation, accumulator)
    }

    /// Starts a streamed completion.
    ///
    /// Waits for the engine's first delta so that failures before any output
    /// are returned as `Err`. The rest is produced on a separate task.
    pub async fn stream(
        &self,
        context: CompletionContext,
        request: CompletionRequest,
    ) -> Result<CompletionOutcome> {
        let (generation, accumulator) = match self.prepare(context, request, true) {
            Prepared::Synthetic(completion) => return Ok(CompletionOutcome::Synthetic(completion)),
            Prepared::Generate(generation, accumulator) => (generation, accumulator),
        };

        let mut deltas = self.inference.generate(generation).await?;
        let first = deltas.next().await.transpose()?;

        let (sender, receiver) = mpsc::channel(self.channel_capacity);
        let cancel = CancellationToken::new();
        let cancelled = cancel.clone();
        let dialog_id = accumulator.id.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancelled.cancelled() => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        %dialog_id,
                        "Completion stream cancelled by consumer"
                    );
                }
                () = produce(accumulator, first, deltas, sender) => {}
            }
        });

        Ok(CompletionOutcome::Streaming(CompletionStream::new(
            receiver,
            cancel.drop_guard(),
        )))
    }

    /// Runs a completion to the end and returns the aggregated answer.
    pub async fn complete(
        &self,
        context: CompletionContext,
        request: CompletionRequest,
    ) -> Result<CompletionAnswer> {
        let (generation, mut accumulator) = match self.prepare(context, request, false) {
            Prepared::Synthetic(completion) => return Ok(CompletionAnswer::Synthetic(completion)),
            Prepared::Generate(generation, accumulator) => (generation, accumulator),
        };

        let mut deltas = self.inference.generate(generation).await?;
        while let Some(delta) = deltas.next().await {
            accumulator.append(&delta?);
        }

        Ok(CompletionAnswer::Generated(accumulator.into_completion()))
    }
}

/// Forwards deltas as chunks and appends the final usage chunk.
///
/// Stops early if the consumer went away. An engine error is forwarded once,
/// after which the channel closes without a final chunk.
async fn produce(
    mut accumulator: Accumulator,
    first: Option<String>,
    mut deltas: DeltaStream,
    sender: mpsc::Sender<Result<ChatCompletionChunk>>,
) {
    if let Some(delta) = first
        && sender.send(Ok(accumulator.push(delta))).await.is_err()
    {
        return;
    }

    while let Some(item) = deltas.next().await {
        match item {
            Ok(delta) => {
                if sender.send(Ok(accumulator.push(delta))).await.is_err() {
                    return;
                }
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    dialog_id = %accumulator.id,
                    chunks = accumulator.chunks,
                    error = %error,
                    "Engine failed mid-stream"
                );
                let _ = sender.send(Err(error)).await;
                return;
            }
        }
    }

    let _ = sender.send(Ok(accumulator.finish())).await;
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use converse_core::dialog::{DefaultTemplate, DialogPatch};
    use converse_core::{Error, ServiceHealth};
    use futures_util::stream;

    use super::*;
    use crate::service::InferenceProvider;
    use crate::tokenizer::WhitespaceTokenizer;
    use crate::types::CompletionMessage;

    #[derive(Default)]
    struct ScriptedProvider {
        deltas: Vec<&'static str>,
        fail_at: Option<usize>,
        refuse: bool,
        seen: Arc<Mutex<Vec<GenerationRequest>>>,
    }

    #[async_trait::async_trait]
    impl InferenceProvider for ScriptedProvider {
        async fn generate(&self, request: GenerationRequest) -> Result<DeltaStream> {
            self.seen.lock().unwrap().push(request);
            if self.refuse {
                return Err(Error::external_error().with_message("engine unavailable"));
            }

            let items: Vec<Result<String>> = self
                .deltas
                .iter()
                .enumerate()
                .map(|(index, delta)| match self.fail_at {
                    Some(at) if at == index => {
                        Err(Error::external_error().with_message("engine crashed"))
                    }
                    _ => Ok((*delta).to_owned()),
                })
                .collect();
            Ok(stream::iter(items).boxed())
        }

        async fn health_check(&self) -> Result<ServiceHealth> {
            Ok(ServiceHealth::healthy())
        }
    }

    struct SetOnDrop(Arc<AtomicBool>);

    impl Drop for SetOnDrop {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    /// Yields one delta, then never finishes.
    struct HangingProvider {
        dropped: Arc<AtomicBool>,
    }

    #[async_trait::async_trait]
    impl InferenceProvider for HangingProvider {
        async fn generate(&self, _request: GenerationRequest) -> Result<DeltaStream> {
            let guard = SetOnDrop(Arc::clone(&self.dropped));
            let deltas = async_stream::stream! {
                let _guard = guard;
                yield Ok::<_, Error>("thinking".to_owned());
                std::future::pending::<()>().await;
            };
            Ok(deltas.boxed())
        }

        async fn health_check(&self) -> Result<ServiceHealth> {
            Ok(ServiceHealth::healthy())
        }
    }

    fn adapter<P: InferenceProvider + 'static>(provider: P) -> CompletionAdapter {
        CompletionAdapter::new(InferenceService::new(provider), WhitespaceTokenizer)
            .with_channel_capacity(4)
    }

    fn context() -> CompletionContext {
        let patch = DialogPatch {
            name: Some("support".into()),
            ..Default::default()
        };
        let dialog = DefaultTemplate::global()
            .assemble(Uuid::now_v7(), Uuid::now_v7(), patch, "chat")
            .unwrap();
        CompletionContext {
            tenant_id: dialog.tenant_id,
            dialog: Arc::new(dialog),
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new(
            "any-model",
            vec![
                CompletionMessage::system("ignored entirely"),
                CompletionMessage::user("what is rust"),
                CompletionMessage::assistant("a language"),
                CompletionMessage::user("tell me more"),
            ],
        )
        .with_session("session-1")
    }

    fn scripted(deltas: Vec<&'static str>) -> ScriptedProvider {
        ScriptedProvider {
            deltas,
            ..Default::default()
        }
    }

    async fn collect(stream: CompletionStream) -> Vec<Result<ChatCompletionChunk>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn system_only_history_gets_synthetic_answer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let provider = ScriptedProvider {
            seen: Arc::clone(&seen),
            ..Default::default()
        };
        let request = CompletionRequest::new("m", vec![CompletionMessage::system("x")]);

        let outcome = adapter(provider).stream(context(), request).await.unwrap();
        let CompletionOutcome::Synthetic(completion) = outcome else {
            panic!("expected a synthetic answer");
        };

        assert_eq!(completion.content(), NO_VALID_MESSAGES);
        assert_eq!(completion.usage.prompt_tokens, 0);
        assert_eq!(
            completion.usage.completion_tokens,
            WhitespaceTokenizer.count(NO_VALID_MESSAGES)
        );
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn system_only_history_is_synthetic_without_streaming() {
        let request = CompletionRequest::new("m", vec![CompletionMessage::system("x")]);
        let answer = adapter(scripted(vec!["unused"]))
            .complete(context(), request)
            .await
            .unwrap();

        assert!(answer.is_synthetic());
        assert_eq!(answer.completion().content(), NO_VALID_MESSAGES);
    }

    #[tokio::test]
    async fn stream_emits_deltas_then_usage() {
        let context = context();
        let dialog_id = context.dialog.id.to_string();
        let outcome = adapter(scripted(vec!["Rust is", " a systems", " language"]))
            .stream(context, request())
            .await
            .unwrap();
        let CompletionOutcome::Streaming(stream) = outcome else {
            panic!("expected a stream");
        };

        let chunks: Vec<_> = collect(stream)
            .await
            .into_iter()
            .map(|chunk| chunk.unwrap())
            .collect();
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|chunk| chunk.id == dialog_id));
        assert!(chunks.iter().all(|chunk| chunk.created == chunks[0].created));
        assert!(chunks.iter().all(|chunk| chunk.model == "any-model"));
        assert_eq!(chunks[0].choices[0].delta.role, Some(Role::Assistant));
        assert_eq!(chunks[1].choices[0].delta.role, None);

        let text: String = chunks.iter().filter_map(|chunk| chunk.content()).collect();
        assert_eq!(text, "Rust is a systems language");

        let last = chunks.last().unwrap();
        assert!(last.is_final());
        let usage = last.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 8);
        assert_eq!(usage.completion_tokens, 5);
        assert_eq!(usage.prompt_tokens + usage.completion_tokens, usage.total_tokens);
    }

    #[tokio::test]
    async fn engine_receives_last_user_question_and_session() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let provider = ScriptedProvider {
            deltas: vec!["ok"],
            seen: Arc::clone(&seen),
            ..Default::default()
        };

        adapter(provider).complete(context(), request()).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].question, "tell me more");
        assert_eq!(seen[0].session_id.as_deref(), Some("session-1"));
        assert!(!seen[0].stream);
    }

    #[tokio::test]
    async fn streaming_and_complete_agree() {
        let deltas = vec!["one", " two", " three"];
        let adapter = adapter(scripted(deltas));

        let answer = adapter.complete(context(), request()).await.unwrap();
        assert!(!answer.is_synthetic());
        let completion = answer.into_completion();
        let CompletionOutcome::Streaming(stream) =
            adapter.stream(context(), request()).await.unwrap()
        else {
            panic!("expected a stream");
        };
        let chunks: Vec<_> = collect(stream)
            .await
            .into_iter()
            .map(|chunk| chunk.unwrap())
            .collect();

        let streamed: String = chunks.iter().filter_map(|chunk| chunk.content()).collect();
        assert_eq!(streamed, completion.content());
        assert_eq!(chunks.last().unwrap().usage, Some(completion.usage));
    }

    #[tokio::test]
    async fn refusal_is_an_error_before_any_chunk() {
        let provider = ScriptedProvider {
            refuse: true,
            ..Default::default()
        };
        let error = adapter(provider)
            .stream(context(), request())
            .await
            .unwrap_err();
        assert_eq!(error.message(), "engine unavailable");
    }

    #[tokio::test]
    async fn failure_on_first_delta_is_an_error() {
        let provider = ScriptedProvider {
            deltas: vec!["never"],
            fail_at: Some(0),
            ..Default::default()
        };
        assert!(adapter(provider).stream(context(), request()).await.is_err());
    }

    #[tokio::test]
    async fn failure_mid_stream_ends_without_usage() {
        let provider = ScriptedProvider {
            deltas: vec!["partial", "lost", "lost"],
            fail_at: Some(1),
            ..Default::default()
        };
        let CompletionOutcome::Streaming(stream) =
            adapter(provider).stream(context(), request()).await.unwrap()
        else {
            panic!("expected a stream");
        };

        let items = collect(stream).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().content(), Some("partial"));
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn failure_mid_complete_is_an_error() {
        let provider = ScriptedProvider {
            deltas: vec!["partial", "lost"],
            fail_at: Some(1),
            ..Default::default()
        };
        assert!(adapter(provider).complete(context(), request()).await.is_err());
    }

    #[tokio::test]
    async fn empty_answer_still_ends_with_usage() {
        let CompletionOutcome::Streaming(stream) = adapter(scripted(Vec::new()))
            .stream(context(), request())
            .await
            .unwrap()
        else {
            panic!("expected a stream");
        };

        let items = collect(stream).await;
        assert_eq!(items.len(), 1);
        let last = items[0].as_ref().unwrap();
        assert!(last.is_final());
        assert_eq!(last.usage.unwrap().completion_tokens, 0);
    }

    #[tokio::test]
    async fn dropping_the_stream_cancels_the_engine() {
        let dropped = Arc::new(AtomicBool::new(false));
        let provider = HangingProvider {
            dropped: Arc::clone(&dropped),
        };

        let CompletionOutcome::Streaming(mut stream) =
            adapter(provider).stream(context(), request()).await.unwrap()
        else {
            panic!("expected a stream");
        };
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.content(), Some("thinking"));
        assert!(!dropped.load(Ordering::SeqCst));

        drop(stream);
        tokio::time::timeout(Duration::from_secs(1), async {
            while !dropped.load(Ordering::SeqCst) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }
}
