use std::time::Instant;
use futures::stream;
use tracing::{debug, info, info_span, warn, Instrument, Span};
use uuid::Uuid;
use super::state::{DecodeState, StopReason};
use super::token_stream::TokenStream;
use crate::backend::{Backend, Floats, Ids, Runtime};
use crate::config::GenerationConfig;
use crate::error::{GenerationError, Result, Stage};
use crate::model::Decoder;
use crate::sampler::{GreedySampler, Sampler};
use crate::tensor::constant::BATCH_DIM;
use crate::tensor::operations::{dim, filled};

/// Optional tensors for a generation.
pub struct GenerateOptions<R>
where R: Runtime
{
    /// Mask over the encoder output, handed to the decoder on every step
    pub encoder_attention: Option<Ids<R>>,

    /// `(batch, seq)` tokens to start from instead of a single bos column
    pub initial_input: Option<Ids<R>>,

    /// Mask for `initial_input`; all ones when omitted
    pub initial_attention: Option<Ids<R>>,
}

impl<R> Default for GenerateOptions<R>
where R: Runtime
{
    fn default() -> Self {
        Self {
            encoder_attention: None,
            initial_input: None,
            initial_attention: None,
        }
    }
}

impl<R> Clone for GenerateOptions<R>
where R: Runtime
{
    fn clone(&self) -> Self {
        Self {
            encoder_attention: self.encoder_attention.clone(),
            initial_input: self.initial_input.clone(),
            initial_attention: self.initial_attention.clone(),
        }
    }
}

impl<R> GenerateOptions<R>
where R: Runtime
{
    pub fn with_encoder_attention(mut self, attention: Ids<R>) -> Self {
        self.encoder_attention = Some(attention);
        self
    }

    pub fn with_initial_input(mut self, input: Ids<R>) -> Self {
        self.initial_input = Some(input);
        self
    }

    pub fn with_initial_attention(mut self, attention: Ids<R>) -> Self {
        self.initial_attention = Some(attention);
        self
    }
}

/// # Generation
///
/// One batched autoregressive generation: the decoding state machine plus everything
/// it needs to run a step.
///
/// A generation is `Running` until a stopping criterion holds after a step, or a step
/// fails, after which it is done and produces nothing more. Nothing runs ahead of the
/// caller: each [`Generation::next_step`] performs exactly one decoder forward pass.
///
/// ## Type Parameters
///
/// * `D` - The decoder to drive; its [`Runtime`] fixes every tensor type involved
///
/// ```rust,ignore
/// let config = GenerationConfig::new(0).with_eos_token_id(2);
/// let mut generation = Generation::new(decoder, encoder_output, config, GenerateOptions::default())?;
///
/// while let Some(tokens) = generation.next_step().await {
///     println!("{:?}", tokens?);
/// }
/// assert!(generation.state().all_finished());
/// ```
pub struct Generation<D>
where D: Decoder
{
    id: Uuid,
    decoder: D,
    sampler: Box<dyn Sampler<Floats<D::Runtime>>>,
    encoder_output: Floats<D::Runtime>,
    encoder_attention: Option<Ids<D::Runtime>>,
    config: GenerationConfig,
    state: DecodeState<Ids<D::Runtime>>,
    stop_reason: Option<StopReason>,
    failed: bool,
    span: Span,
}

impl<D> Generation<D>
where D: Decoder
{
    /// Prepares a generation. No forward pass runs until the first step is requested.
    ///
    /// # Parameters
    ///
    /// * `decoder` - The decoder to drive
    /// * `encoder_output` - Hidden states shared read-only by every step; its first
    ///   dimension is the batch size
    /// * `config` - Token ids and stopping criteria
    /// * `options` - Encoder attention mask and initial decoder tensors
    ///
    /// # Errors
    ///
    /// [`GenerationError::Configuration`] if the encoder output has no batch dimension,
    /// or initial decoder tensors are malformed or disagree with the encoder batch size.
    pub fn new(
        decoder: D,
        encoder_output: Floats<D::Runtime>,
        config: GenerationConfig,
        options: GenerateOptions<D::Runtime>,
    ) -> Result<Self> {
        let batch_size = dim(&encoder_output, BATCH_DIM).map_err(|_| {
            GenerationError::Configuration("encoder output has no batch dimension".into())
        })?;
        let device = encoder_output.device();

        let state = match options.initial_input {
            Some(input) => DecodeState::from_initial(input, options.initial_attention)?,
            None => match options.initial_attention {
                Some(attention) => DecodeState::from_initial(
                    filled(config.bos_token_id, batch_size, 1, &device)?,
                    Some(attention),
                )?,
                None => DecodeState::new(batch_size, config.bos_token_id, &device)?,
            },
        };
        if state.batch_size() != batch_size {
            return Err(GenerationError::Configuration(format!(
                "initial decoder batch of {} does not match encoder batch of {}",
                state.batch_size(),
                batch_size
            )));
        }

        let id = Uuid::new_v4();
        let span = info_span!("generation", %id, batch_size);
        if !config.is_bounded() {
            span.in_scope(|| {
                warn!("no max_tokens, max_length or eos_token_id configured; generation will not stop on its own")
            });
        }

        Ok(Self {
            id,
            decoder,
            sampler: Box::new(GreedySampler),
            encoder_output,
            encoder_attention: options.encoder_attention,
            config,
            state,
            stop_reason: None,
            failed: false,
            span,
        })
    }

    /// Replace the default [`GreedySampler`].
    pub fn with_sampler<S: Sampler<Floats<D::Runtime>> + 'static>(mut self, sampler: S) -> Self {
        self.sampler = Box::new(sampler);
        self
    }

    /// Identifier recorded on this generation's tracing span.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The decoding state after the most recent step.
    pub fn state(&self) -> &DecodeState<Ids<D::Runtime>> {
        &self.state
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Why the generation stopped, if a stopping criterion was met.
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// True once no further steps will be produced.
    pub fn is_done(&self) -> bool {
        self.failed || self.stop_reason.is_some()
    }

    /// Runs one decode step and returns the token sampled for each row.
    ///
    /// Returns `None` once the generation is done. An error ends the generation:
    /// it is returned once and every later call returns `None`.
    pub async fn next_step(&mut self) -> Option<Result<Vec<i64>>> {
        if self.is_done() {
            return None;
        }
        let span = self.span.clone();
        let result = self.step().instrument(span).await;
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }

    async fn step(&mut self) -> Result<Vec<i64>> {
        let started = Instant::now();
        let logits = self
            .decoder
            .forward(
                &self.encoder_output,
                self.state.decoder_input(),
                self.state.decoder_attention(),
                self.encoder_attention.as_ref(),
            )
            .await
            .map_err(|e| GenerationError::forward(Stage::Decoder, e))?;

        let tokens = self.sampler.sample(&logits)?;
        self.state = self.state.advance(&tokens, &self.config)?;

        let finished = self.state.finished().iter().filter(|f| **f).count();
        debug!(
            step = self.state.len(),
            finished,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "decode step"
        );

        if let Some(reason) = self.state.stop_reason(&self.config) {
            info!(steps = self.state.len(), %reason, "generation finished");
            self.stop_reason = Some(reason);
        }
        Ok(tokens)
    }

    /// Drives the generation to completion and returns each row's sampled tokens.
    ///
    /// Use [`Generation::into_stream`] or [`Generation::next_step`] instead if tokens
    /// already produced must survive a failing step.
    pub async fn collect_rows(mut self) -> Result<Vec<Vec<i64>>> {
        let mut rows = vec![Vec::new(); self.state.batch_size()];
        while let Some(tokens) = self.next_step().await {
            for (row, token) in rows.iter_mut().zip(tokens?) {
                row.push(token);
            }
        }
        Ok(rows)
    }

    /// Converts the generation into a lazily driven [`TokenStream`].
    pub fn into_stream<'a>(self) -> TokenStream<'a>
    where D: 'a
    {
        TokenStream::new(stream::unfold(self, |mut generation| async move {
            let item = generation.next_step().await?;
            Some((item, generation))
        }))
    }
}
