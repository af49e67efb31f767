//! # Tensor Backend
//!
//! The generation loop never owns a tensor implementation. It works against the
//! [`Backend`] operations (shape, concatenation, slicing) and lets the tensor
//! runtime a model already uses carry them out. A [`Runtime`] names the id, float
//! and image tensor types a model works with.

//! ## Feature Flags
//!
//! The module uses feature flags to conditionally compile support for different backends:
//!
//! - `candle`: Enables support for the Candle tensor library
//! - `burn`: Enables support for the Burn tensor library

mod core_trait;

#[cfg_attr(docsrs, doc(cfg(feature = "candle")))]
#[cfg(feature = "candle")]
/// Candle tensor backend implementation.
///
/// This module is only available when the `candle` feature flag is enabled.
pub mod candle;

#[cfg_attr(docsrs, doc(cfg(feature = "burn")))]
#[cfg(feature = "burn")]
/// Burn tensor backend implementation.
///
/// This module is only available when the `burn` feature flag is enabled.
/// Burn fixes rank and kind in the type, so the backend operations are
/// implemented for ranks `1` to `4`.
pub mod burn;

#[cfg(test)]
/// A host-only tensor used to exercise the generation loop without a runtime.
pub(crate) mod mock_tensor;

// Re-export the core traits for convenient imports
pub use core_trait::*;
