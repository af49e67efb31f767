//! # Tensor Helpers
//!
//! Reserved dimensions and the few compound operations the generation loop builds
//! from [`Backend`](crate::backend::Backend) primitives.

pub mod constant;
pub(crate) mod operations;
