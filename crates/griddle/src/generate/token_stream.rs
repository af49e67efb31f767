use std::pin::Pin;
use std::task::{Context, Poll};
use futures::Stream;
use crate::error::Result;

/// # TokenStream
///
/// The per-step output of a generation as a [`Stream`]. Each item is one token id
/// per batch row.
///
/// ## Usage Context
///
/// The stream is lazy and single-consumer. Polling it is what drives the decoder:
/// a step only runs when the next item is requested, so dropping the stream cancels
/// the generation between steps.
///
/// ## Termination
///
/// The stream ends when a stopping criterion is met. If a step fails, its error is
/// yielded once and the stream then ends; items already yielded stay valid.
pub struct TokenStream<'a> {
    /// The underlying step stream
    inner: Pin<Box<dyn Stream<Item = Result<Vec<i64>>> + Send + 'a>>,
}

impl<'a> TokenStream<'a> {
    pub(crate) fn new<S>(stream: S) -> Self
    where S: Stream<Item = Result<Vec<i64>>> + Send + 'a
    {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl Stream for TokenStream<'_> {
    type Item = Result<Vec<i64>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().inner.as_mut().poll_next(cx)
    }
}
