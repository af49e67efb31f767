//! # Samplers
//!
//! A [`Sampler`] picks the next token of every row from a logits tensor of
//! shape `(batch, seq, vocab)`. Only the final sequence position is ever read.

use crate::backend::FloatOps;
use crate::error::{GenerationError, Result};
use crate::tensor::constant::{BATCH_DIM, SEQ_DIM, VOCAB_DIM};

/// Single-step token selection policy over logits of type `F`.
///
/// Implementations must be pure: the same logits always give the same tokens.
pub trait Sampler<F>: Send + Sync {
    /// Returns one token id per batch row, in batch order.
    fn sample(&self, logits: &F) -> Result<Vec<i64>>;
}

impl<F, S> Sampler<F> for Box<S>
where S: Sampler<F> + ?Sized
{
    fn sample(&self, logits: &F) -> Result<Vec<i64>> {
        (**self).sample(logits)
    }
}

/// Argmax over the vocabulary at the last sequence position.
///
/// Ties resolve to the lowest index, since a later value must be strictly greater
/// to replace the current maximum.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySampler;

impl<F> Sampler<F> for GreedySampler
where F: FloatOps
{
    fn sample(&self, logits: &F) -> Result<Vec<i64>> {
        let shape = logits.shape();
        if shape.len() != 3 {
            return Err(GenerationError::Shape(format!(
                "logits must be (batch, seq, vocab), got {:?}",
                shape
            )));
        }
        let (batch, seq, vocab) = (shape[BATCH_DIM], shape[SEQ_DIM], shape[VOCAB_DIM]);
        if seq == 0 || vocab == 0 {
            return Err(GenerationError::Shape(format!(
                "cannot sample from empty logits {:?}",
                shape
            )));
        }

        let values = logits.slice(SEQ_DIM, seq - 1, 1)?.to_f32s()?;
        if values.len() != batch * vocab {
            return Err(GenerationError::Shape(format!(
                "expected {} logits at the last position of {:?}, got {}",
                batch * vocab,
                shape,
                values.len()
            )));
        }
        Ok(values
            .chunks(vocab)
            .map(|row| argmax(row) as i64)
            .collect())
    }
}

fn argmax(values: &[f32]) -> usize {
    let mut max_idx = 0;
    let mut max = values[0];
    for (idx, value) in values.iter().enumerate().skip(1) {
        if *value > max {
            max_idx = idx;
            max = *value;
        }
    }
    max_idx
}
