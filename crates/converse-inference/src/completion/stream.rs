use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use converse_core::Result;
use futures_util::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::DropGuard;

use crate::types::ChatCompletionChunk;

/// Ordered chunks of one streamed completion.
///
/// Ends after the final usage-bearing chunk, or right after an `Err` item if
/// the engine failed mid-stream. Dropping the stream cancels the producer
/// task and the engine call behind it.
pub struct CompletionStream {
    receiver: mpsc::Receiver<Result<ChatCompletionChunk>>,
    _cancel_on_drop: DropGuard,
}

impl CompletionStream {
    pub(crate) fn new(
        receiver: mpsc::Receiver<Result<ChatCompletionChunk>>,
        cancel_on_drop: DropGuard,
    ) -> Self {
        Self {
            receiver,
            _cancel_on_drop: cancel_on_drop,
        }
    }
}

impl Stream for CompletionStream {
    type Item = Result<ChatCompletionChunk>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl fmt::Debug for CompletionStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionStream").finish_non_exhaustive()
    }
}
