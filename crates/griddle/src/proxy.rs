//! # Forward Pass Proxies
//!
//! Many runtimes expose a synchronous `forward`. Calling one directly from an async
//! generation blocks the executor for the whole pass, so this module offers two
//! adapters from the blocking traits to [`Encoder`] and [`Decoder`]:
//!
//! * [`Proxied`] ships each pass to tokio's blocking thread pool and suspends until it
//!   completes. Inputs are copied across the boundary, the way a message to a worker
//!   would be.
//! * [`Direct`] runs the pass inline on the task driving the generation.
//!
//! Neither adapter can cancel a pass once it has started.

use std::sync::Arc;
use async_trait::async_trait;
use crate::backend::{Floats, Ids, Runtime};
use crate::error::ForwardError;
use crate::model::{Decoder, Encoder};

/// A synchronous [`Encoder`].
pub trait BlockingEncoder<I>: Send + Sync + 'static {
    type Runtime: Runtime;

    fn forward(
        &self,
        input: &I,
        attention_mask: Option<&Ids<Self::Runtime>>,
        conditioning: Option<&Floats<Self::Runtime>>,
    ) -> Result<Floats<Self::Runtime>, ForwardError>;
}

/// A synchronous [`Decoder`].
pub trait BlockingDecoder: Send + Sync + 'static {
    type Runtime: Runtime;

    fn forward(
        &self,
        encoder_output: &Floats<Self::Runtime>,
        decoder_input: &Ids<Self::Runtime>,
        decoder_attention: &Ids<Self::Runtime>,
        encoder_attention: Option<&Ids<Self::Runtime>>,
    ) -> Result<Floats<Self::Runtime>, ForwardError>;
}

/// Runs a blocking model's forward passes on the blocking thread pool.
pub struct Proxied<M> {
    model: Arc<M>,
}

impl<M> Proxied<M> {
    pub fn new(model: M) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    pub fn from_arc(model: Arc<M>) -> Self {
        Self { model }
    }
}

impl<M> Clone for Proxied<M> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
        }
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T, ForwardError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ForwardError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| -> ForwardError { Box::new(e) })?
}

#[async_trait]
impl<I, M> Encoder<I> for Proxied<M>
where
    I: Clone + Send + Sync + 'static,
    M: BlockingEncoder<I>,
{
    type Runtime = M::Runtime;

    async fn forward(
        &self,
        input: &I,
        attention_mask: Option<&Ids<Self::Runtime>>,
        conditioning: Option<&Floats<Self::Runtime>>,
    ) -> Result<Floats<Self::Runtime>, ForwardError> {
        let model = self.model.clone();
        let input = input.clone();
        let attention_mask = attention_mask.cloned();
        let conditioning = conditioning.cloned();
        run_blocking(move || model.forward(&input, attention_mask.as_ref(), conditioning.as_ref())).await
    }
}

#[async_trait]
impl<M> Decoder for Proxied<M>
where M: BlockingDecoder
{
    type Runtime = M::Runtime;

    async fn forward(
        &self,
        encoder_output: &Floats<Self::Runtime>,
        decoder_input: &Ids<Self::Runtime>,
        decoder_attention: &Ids<Self::Runtime>,
        encoder_attention: Option<&Ids<Self::Runtime>>,
    ) -> Result<Floats<Self::Runtime>, ForwardError> {
        let model = self.model.clone();
        let encoder_output = encoder_output.clone();
        let decoder_input = decoder_input.clone();
        let decoder_attention = decoder_attention.clone();
        let encoder_attention = encoder_attention.cloned();
        run_blocking(move || {
            model.forward(
                &encoder_output,
                &decoder_input,
                &decoder_attention,
                encoder_attention.as_ref(),
            )
        })
        .await
    }
}

/// Runs a blocking model's forward passes inline.
pub struct Direct<M> {
    model: Arc<M>,
}

impl<M> Direct<M> {
    pub fn new(model: M) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    pub fn from_arc(model: Arc<M>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<I, M> Encoder<I> for Direct<M>
where
    I: Sync,
    M: BlockingEncoder<I>,
{
    type Runtime = M::Runtime;

    async fn forward(
        &self,
        input: &I,
        attention_mask: Option<&Ids<Self::Runtime>>,
        conditioning: Option<&Floats<Self::Runtime>>,
    ) -> Result<Floats<Self::Runtime>, ForwardError> {
        self.model.forward(input, attention_mask, conditioning)
    }
}

#[async_trait]
impl<M> Decoder for Direct<M>
where M: BlockingDecoder
{
    type Runtime = M::Runtime;

    async fn forward(
        &self,
        encoder_output: &Floats<Self::Runtime>,
        decoder_input: &Ids<Self::Runtime>,
        decoder_attention: &Ids<Self::Runtime>,
        encoder_attention: Option<&Ids<Self::Runtime>>,
    ) -> Result<Floats<Self::Runtime>, ForwardError> {
        self.model
            .forward(encoder_output, decoder_input, decoder_attention, encoder_attention)
    }
}
