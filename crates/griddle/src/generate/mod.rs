//! # Generation Loop
//!
//! Batched autoregressive decoding with per-row early stopping.
//!
//! ## Overview
//!
//! A [`Generation`] owns a [`DecodeState`] (the growing token history, its attention
//! mask, per-row completion flags and a step counter) and advances it one decoder
//! forward pass at a time:
//!
//! 1. Run the [`Decoder`](crate::model::Decoder) on the current state
//! 2. Sample one token per row from the logits at the final position
//! 3. Hand the tokens to the caller
//! 4. Mark rows that produced the end-of-sequence token as finished
//! 5. Append each row's token, and an attention bit, by building new tensors
//! 6. Stop once `max_tokens` or `max_length` steps were taken, or every row finished
//!
//! Finished rows keep receiving tokens so every row stays the same length; they are
//! hidden from the decoder through the attention mask instead.
//!
//! ## Consumption
//!
//! Steps are pulled, never pushed. Call [`Generation::next_step`] directly, or turn the
//! generation into a [`TokenStream`] and use the usual `futures` combinators:
//!
//! ```rust,ignore
//! let mut stream = generation.into_stream();
//! while let Some(tokens) = stream.next().await {
//!     println!("{:?}", tokens?);
//! }
//! ```
//!
//! Dropping the stream between steps is the only way to cancel; a forward pass that
//! has started always runs to completion.

mod generation;
mod state;
mod token_stream;

pub use generation::{GenerateOptions, Generation};
pub use state::{DecodeState, StopReason};
pub use token_stream::TokenStream;
