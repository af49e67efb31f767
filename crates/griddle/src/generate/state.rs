use std::fmt;
use crate::backend::IdOps;
use crate::config::{AttentionPolicy, GenerationConfig};
use crate::error::{GenerationError, Result};
use crate::tensor::constant::{BATCH_DIM, SEQ_DIM};
use crate::tensor::operations::{append_column, dim, filled, where_equals_token};

/// Why a generation stopped on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `max_tokens` decode steps were taken
    MaxTokens,
    /// `max_length` decode steps were taken
    MaxLength,
    /// Every row has emitted the end-of-sequence token
    AllFinished,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::MaxTokens => write!(f, "max_tokens"),
            StopReason::MaxLength => write!(f, "max_length"),
            StopReason::AllFinished => write!(f, "all_finished"),
        }
    }
}

/// # DecodeState
///
/// The batched decoding state of one generation, captured explicitly so it can be
/// inspected between steps.
///
/// ## Type Parameters
///
/// * `T` - The runtime's id tensor type, used for both the token history and its mask
///
/// ## Invariants
///
/// * `decoder_input` and `decoder_attention` are both `(batch, initial_length + len)`
/// * `finished[i]` only ever goes from `false` to `true`
///
/// A state is never mutated. [`DecodeState::advance`] builds the next one, so a
/// snapshot held from an earlier step stays valid.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeState<T> {
    decoder_input: T,
    decoder_attention: T,
    finished: Vec<bool>,
    len: usize,
    initial_length: usize,
}

impl<T> DecodeState<T>
where T: IdOps
{
    /// Every row starts as `[bos_token_id]`, fully attended.
    pub fn new(batch_size: usize, bos_token_id: i64, device: &T::Device) -> Result<Self> {
        Ok(Self {
            decoder_input: filled(bos_token_id, batch_size, 1, device)?,
            decoder_attention: filled(1, batch_size, 1, device)?,
            finished: vec![false; batch_size],
            len: 0,
            initial_length: 1,
        })
    }

    /// Seeds the state from caller supplied tensors.
    ///
    /// # Parameters
    ///
    /// * `decoder_input` - `(batch, seq)` initial token history
    /// * `decoder_attention` - mask of the same shape; all ones when omitted
    ///
    /// # Errors
    ///
    /// [`GenerationError::Configuration`] if the input is not rank 2, has an empty
    /// sequence, or the mask's shape differs from the input's.
    pub fn from_initial(decoder_input: T, decoder_attention: Option<T>) -> Result<Self> {
        let shape = decoder_input.shape();
        if shape.len() != 2 {
            return Err(GenerationError::Configuration(format!(
                "initial decoder input must be (batch, seq), got {:?}",
                shape
            )));
        }
        let batch_size = dim(&decoder_input, BATCH_DIM)?;
        let initial_length = dim(&decoder_input, SEQ_DIM)?;
        if initial_length == 0 {
            return Err(GenerationError::Configuration(
                "initial decoder input must hold at least one token per row".into(),
            ));
        }
        let decoder_attention = match decoder_attention {
            Some(attention) => attention,
            None => filled(1, batch_size, initial_length, &decoder_input.device())?,
        };
        if decoder_attention.shape() != shape {
            return Err(GenerationError::Configuration(format!(
                "initial decoder attention {:?} does not match decoder input {:?}",
                decoder_attention.shape(),
                shape
            )));
        }
        Ok(Self {
            decoder_input,
            decoder_attention,
            finished: vec![false; batch_size],
            len: 0,
            initial_length,
        })
    }

    /// `(batch, seq)` token history, including every token sampled so far.
    pub fn decoder_input(&self) -> &T {
        &self.decoder_input
    }

    /// `(batch, seq)` mask of live positions.
    pub fn decoder_attention(&self) -> &T {
        &self.decoder_attention
    }

    /// Per-row completion flags, in batch order.
    pub fn finished(&self) -> &[bool] {
        &self.finished
    }

    /// Number of completed decode steps.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sequence length the state was seeded with.
    pub fn initial_length(&self) -> usize {
        self.initial_length
    }

    pub fn batch_size(&self) -> usize {
        self.finished.len()
    }

    pub fn all_finished(&self) -> bool {
        self.finished.iter().all(|f| *f)
    }

    /// Each row's full token history as a `(1, seq)` tensor.
    pub fn sequences(&self) -> Result<Vec<T>> {
        self.decoder_input.vectorize_dim(BATCH_DIM)
    }

    /// Builds the state that follows sampling `tokens`.
    ///
    /// 1. Rows that sampled the end-of-sequence token are marked finished, permanently
    /// 2. Every row, finished or not, gets its token appended to the history
    /// 3. Every row gets an attention bit appended, chosen by the configured
    ///    [`AttentionPolicy`]
    /// 4. The step counter is incremented
    ///
    /// # Errors
    ///
    /// [`GenerationError::Shape`] if `tokens` does not hold exactly one id per row.
    pub fn advance(&self, tokens: &[i64], config: &GenerationConfig) -> Result<Self> {
        if tokens.len() != self.batch_size() {
            return Err(GenerationError::Shape(format!(
                "sampler returned {} tokens for a batch of {}",
                tokens.len(),
                self.batch_size()
            )));
        }

        let mut finished = self.finished.clone();
        if let Some(eos) = config.eos_token_id {
            for idx in where_equals_token(tokens, eos) {
                finished[idx] = true;
            }
        }

        let attention: Vec<i64> = tokens
            .iter()
            .zip(finished.iter())
            .map(|(token, done)| {
                let masked = match config.attention_policy {
                    AttentionPolicy::LastToken => config.masks(*token),
                    AttentionPolicy::Sticky => *done || config.masks(*token),
                };
                if masked { 0 } else { 1 }
            })
            .collect();

        Ok(Self {
            decoder_input: append_column(&self.decoder_input, tokens.to_vec())?,
            decoder_attention: append_column(&self.decoder_attention, attention)?,
            finished,
            len: self.len + 1,
            initial_length: self.initial_length,
        })
    }

    /// The first stopping criterion that holds, if any.
    ///
    /// Caps are compared for equality with the step counter, which only ever grows
    /// by one, so each cap fires exactly once. An end-of-sequence id counts as
    /// configured whenever it is `Some`, including `Some(0)`; this is not a
    /// truthiness check.
    pub fn stop_reason(&self, config: &GenerationConfig) -> Option<StopReason> {
        if config.max_tokens == Some(self.len) {
            Some(StopReason::MaxTokens)
        } else if config.max_length == Some(self.len) {
            Some(StopReason::MaxLength)
        } else if config.eos_token_id.is_some() && self.all_finished() {
            Some(StopReason::AllFinished)
        } else {
            None
        }
    }
}
