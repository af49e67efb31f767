//! # Sessions
//!
//! A [`Session`] bundles the pieces of one encoder-decoder model (an optional
//! image encoder, an optional text encoder and a decoder) with the
//! [`GenerationConfig`] used to drive it.
//!
//! Models that only offer a blocking `forward` are wrapped according to the
//! config's [`ExecutionMode`]: inline, or proxied onto the blocking thread pool.

use std::sync::Arc;
use tracing::debug;
use crate::backend::{Floats, Ids, Pixels, Runtime};
use crate::config::{ExecutionMode, GenerationConfig};
use crate::encode::{encode, EncodeInputs};
use crate::error::Result;
use crate::generate::{GenerateOptions, Generation, TokenStream};
use crate::model::{Decoder, Encoder};
use crate::proxy::{BlockingDecoder, BlockingEncoder, Direct, Proxied};

/// A shared decoder handle, as driven by a session's generations.
pub type SharedDecoder<R> = Arc<dyn Decoder<Runtime = R>>;

type SharedEncoder<I, R> = Arc<dyn Encoder<I, Runtime = R>>;

/// An encoder-decoder model ready to generate.
///
/// ## Type Parameters
///
/// * `R` - The [`Runtime`] every component of the model shares
pub struct Session<R>
where R: Runtime
{
    image_encoder: Option<SharedEncoder<Pixels<R>, R>>,
    text_encoder: Option<SharedEncoder<Ids<R>, R>>,
    decoder: SharedDecoder<R>,
    config: GenerationConfig,
}

impl<R> Clone for Session<R>
where R: Runtime
{
    fn clone(&self) -> Self {
        Self {
            image_encoder: self.image_encoder.clone(),
            text_encoder: self.text_encoder.clone(),
            decoder: self.decoder.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R> Session<R>
where R: Runtime
{
    /// A session around an async decoder. Add encoders with the `with_*` methods.
    pub fn new<D>(decoder: D, config: GenerationConfig) -> Self
    where D: Decoder<Runtime = R> + 'static
    {
        Self {
            image_encoder: None,
            text_encoder: None,
            decoder: Arc::new(decoder),
            config,
        }
    }

    /// A session around a blocking decoder, run as `config.execution_mode` says.
    pub fn from_blocking<D>(decoder: D, config: GenerationConfig) -> Self
    where D: BlockingDecoder<Runtime = R>
    {
        debug!(mode = ?config.execution_mode, "creating session from blocking decoder");
        match config.execution_mode {
            ExecutionMode::Inline => Self::new(Direct::new(decoder), config),
            ExecutionMode::Proxied => Self::new(Proxied::new(decoder), config),
        }
    }

    pub fn with_image_encoder<E>(mut self, encoder: E) -> Self
    where E: Encoder<Pixels<R>, Runtime = R> + 'static
    {
        self.image_encoder = Some(Arc::new(encoder));
        self
    }

    pub fn with_text_encoder<E>(mut self, encoder: E) -> Self
    where E: Encoder<Ids<R>, Runtime = R> + 'static
    {
        self.text_encoder = Some(Arc::new(encoder));
        self
    }

    /// Adds a blocking image encoder, run as the config's execution mode says.
    pub fn with_blocking_image_encoder<E>(self, encoder: E) -> Self
    where E: BlockingEncoder<Pixels<R>, Runtime = R>
    {
        match self.config.execution_mode {
            ExecutionMode::Inline => self.with_image_encoder(Direct::new(encoder)),
            ExecutionMode::Proxied => self.with_image_encoder(Proxied::new(encoder)),
        }
    }

    /// Adds a blocking text encoder, run as the config's execution mode says.
    pub fn with_blocking_text_encoder<E>(self, encoder: E) -> Self
    where E: BlockingEncoder<Ids<R>, Runtime = R>
    {
        match self.config.execution_mode {
            ExecutionMode::Inline => self.with_text_encoder(Direct::new(encoder)),
            ExecutionMode::Proxied => self.with_text_encoder(Proxied::new(encoder)),
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Runs this session's encoders on `inputs`.
    ///
    /// See [`encode`] for the dispatch rules and errors.
    pub async fn encode(&self, inputs: &EncodeInputs<R>) -> Result<Floats<R>> {
        encode(
            self.image_encoder.as_deref(),
            self.text_encoder.as_deref(),
            inputs,
        )
        .await
    }

    /// Prepares a generation conditioned on `encoder_output`.
    pub fn generate(
        &self,
        encoder_output: Floats<R>,
        options: GenerateOptions<R>,
    ) -> Result<Generation<SharedDecoder<R>>> {
        Generation::new(self.decoder.clone(), encoder_output, self.config.clone(), options)
    }

    /// Encodes `inputs`, then returns the generation's token stream.
    ///
    /// Encoding happens eagerly; decoding steps run as the stream is polled.
    pub async fn run(&self, inputs: &EncodeInputs<R>, options: GenerateOptions<R>) -> Result<TokenStream<'static>> {
        let encoder_output = self.encode(inputs).await?;
        Ok(self.generate(encoder_output, options)?.into_stream())
    }
}
