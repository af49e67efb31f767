//! # Model Capabilities
//!
//! The generation loop never looks inside a model. It consumes exactly two
//! capabilities, each a single asynchronous `forward` pass:
//!
//! * [`Encoder`] - turns a modality input (pixels, token ids, ...) into hidden states,
//!   optionally conditioned on another modality's hidden states
//! * [`Decoder`] - turns encoder hidden states plus the current token history into
//!   logits of shape `(batch, seq, vocab)`
//!
//! Both are traits so that real runtimes, worker proxies (see [`crate::proxy`]) and
//! test doubles can be swapped freely.

mod core_trait;

pub use core_trait::*;

#[cfg(test)]
/// Scripted model doubles.
///
/// Decoders that emit predetermined tokens per step, so loop behaviour can be
/// asserted without a numerical runtime.
pub(crate) mod mock_model;
