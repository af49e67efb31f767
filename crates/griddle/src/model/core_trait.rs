use std::sync::Arc;
use async_trait::async_trait;
use crate::backend::{Floats, Ids, Runtime};
use crate::error::ForwardError;

/// # Encoder
///
/// A model component that encodes one modality into hidden states.
///
/// ## Type Parameters
///
/// * `I` - The input type, typically [`Pixels`](crate::backend::Pixels) for images or
///   [`Ids`] for text
///
/// ## Input/Output Dimensions
///
/// The batch dimension is always dimension `0` of both input and output. The output's
/// batch size determines the batch size of the generation loop driven from it.
///
/// ## Async Behavior
///
/// `forward` suspends until the pass is complete. There are no partial results and no
/// mid-flight cancellation: once requested, a pass runs to completion.
#[async_trait]
pub trait Encoder<I>: Send + Sync
where I: Sync
{
    /// The tensor types this encoder consumes and produces
    type Runtime: Runtime;

    /// Performs a single forward pass.
    ///
    /// # Parameters
    ///
    /// * `input` - The modality input
    /// * `attention_mask` - Optional `(batch, seq)` mask of live input positions
    /// * `conditioning` - Hidden states of another modality to fuse with, if any
    ///
    /// # Returns
    ///
    /// The encoded hidden states.
    async fn forward(
        &self,
        input: &I,
        attention_mask: Option<&Ids<Self::Runtime>>,
        conditioning: Option<&Floats<Self::Runtime>>,
    ) -> Result<Floats<Self::Runtime>, ForwardError>;
}

/// # Decoder
///
/// The autoregressive half of an encoder-decoder model.
///
/// Each call sees the full token history so far; the generation loop only reads the
/// logits at the final sequence position.
#[async_trait]
pub trait Decoder: Send + Sync {
    /// The tensor types this decoder consumes and produces
    type Runtime: Runtime;

    /// Performs a single decoding forward pass.
    ///
    /// # Parameters
    ///
    /// * `encoder_output` - Hidden states produced once per generation, shared by every step
    /// * `decoder_input` - `(batch, seq)` token history
    /// * `decoder_attention` - `(batch, seq)` mask of live history positions
    /// * `encoder_attention` - Optional mask over the encoder output
    ///
    /// # Returns
    ///
    /// Logits with shape `(batch, seq, vocab)`.
    async fn forward(
        &self,
        encoder_output: &Floats<Self::Runtime>,
        decoder_input: &Ids<Self::Runtime>,
        decoder_attention: &Ids<Self::Runtime>,
        encoder_attention: Option<&Ids<Self::Runtime>>,
    ) -> Result<Floats<Self::Runtime>, ForwardError>;
}

#[async_trait]
impl<I, E> Encoder<I> for Arc<E>
where
    I: Sync,
    E: Encoder<I> + ?Sized,
{
    type Runtime = E::Runtime;

    async fn forward(
        &self,
        input: &I,
        attention_mask: Option<&Ids<Self::Runtime>>,
        conditioning: Option<&Floats<Self::Runtime>>,
    ) -> Result<Floats<Self::Runtime>, ForwardError> {
        (**self).forward(input, attention_mask, conditioning).await
    }
}

#[async_trait]
impl<D> Decoder for Arc<D>
where D: Decoder + ?Sized
{
    type Runtime = D::Runtime;

    async fn forward(
        &self,
        encoder_output: &Floats<Self::Runtime>,
        decoder_input: &Ids<Self::Runtime>,
        decoder_attention: &Ids<Self::Runtime>,
        encoder_attention: Option<&Ids<Self::Runtime>>,
    ) -> Result<Floats<Self::Runtime>, ForwardError> {
        (**self)
            .forward(encoder_output, decoder_input, decoder_attention, encoder_attention)
            .await
    }
}

#[async_trait]
impl<'a, I, E> Encoder<I> for &'a E
where
    I: Sync,
    E: Encoder<I> + ?Sized,
{
    type Runtime = E::Runtime;

    async fn forward(
        &self,
        input: &I,
        attention_mask: Option<&Ids<Self::Runtime>>,
        conditioning: Option<&Floats<Self::Runtime>>,
    ) -> Result<Floats<Self::Runtime>, ForwardError> {
        (**self).forward(input, attention_mask, conditioning).await
    }
}

#[async_trait]
impl<'a, D> Decoder for &'a D
where D: Decoder + ?Sized
{
    type Runtime = D::Runtime;

    async fn forward(
        &self,
        encoder_output: &Floats<Self::Runtime>,
        decoder_input: &Ids<Self::Runtime>,
        decoder_attention: &Ids<Self::Runtime>,
        encoder_attention: Option<&Ids<Self::Runtime>>,
    ) -> Result<Floats<Self::Runtime>, ForwardError> {
        (**self)
            .forward(encoder_output, decoder_input, decoder_attention, encoder_attention)
            .await
    }
}
