//! # Griddle
//!
//! An inference-time orchestration layer for encoder-decoder sequence models:
//! batched autoregressive decoding with per-sequence early stopping.
//!
//! ## Overview
//!
//! Griddle owns the part of generation that has nothing to do with a particular
//! tensor runtime: encoding the inputs once, then looping the decoder one token at a
//! time, growing every row of the batch, masking rows that have ended, and stopping
//! when the configured criteria say so.
//!
//! Key components include:
//!
//! - Encode dispatch across an image encoder, a text encoder, or both fused
//! - A lazily driven, batched generation loop with explicit, inspectable state
//! - A pluggable single-step [`Sampler`](sampler::Sampler), greedy by default
//! - Adapters that move blocking forward passes off the async executor
//!
//! ## Architecture
//!
//! ### Assumptions
//! Regardless of backend used, griddle reserves dimensions with special meanings:
//!  - The `0th` dimension is reserved as the batch dimension
//!  - The `1st` dimension is reserved as the sequence dimension
//!  - Logits carry the vocabulary in the `2nd` dimension
//!
//! ### Backends
//!
//! Tensors stay in the runtime the model already uses. Griddle only asks for a small
//! set of [`Backend`](backend::Backend) operations (shape, concatenation, slicing),
//! and a [`Runtime`](backend::Runtime) names the id, float and image tensor types
//! one model works with.
//!
//! ### Model Traits
//!
//! [`Encoder`](model::Encoder) and [`Decoder`](model::Decoder) each expose a single
//! async `forward` over their runtime's tensors. Griddle never constructs or
//! inspects a model beyond that.
//!
//! ### Generation
//!
//! [`Generation`](generate::Generation) drives a [`Decoder`](model::Decoder) step by
//! step and yields one token per row per step, either through
//! [`next_step`](generate::Generation::next_step) or as a
//! [`TokenStream`](generate::TokenStream).
//!
//! ## Features
//!
//! - **candle** - Implements the backend operations for `candle_core::Tensor`
//! - **burn** - Implements the backend operations for burn tensors of rank 1 to 4
//!
//! ## Logging
//!
//! Griddle emits `tracing` events (one span per generation, a debug event per step)
//! and installs no subscriber of its own.

pub mod backend;
pub mod config;
pub mod encode;
pub mod error;
pub mod generate;
pub mod model;
pub mod proxy;
pub mod sampler;
pub mod session;
pub mod tensor;

/// Constants for client reference
pub use tensor::constant;

pub use backend::{Backend, Runtime};
pub use config::GenerationConfig;
pub use encode::{encode, EncodeInputs};
pub use error::{GenerationError, Result};
pub use generate::{GenerateOptions, Generation, TokenStream};
pub use session::Session;
