use std::fmt::Debug;
use crate::error::Result;

/// The tensor operations the generation loop needs from a tensor runtime.
///
/// Every operation returns a new tensor; the loop never mutates one in place.
pub trait Backend: Debug + Clone + Send + Sync + 'static {
    /// Where the runtime places tensors
    type Device: Clone + Send + Sync;

    /// Return the shape of this tensor
    fn shape(&self) -> Vec<usize>;

    /// The device this tensor lives on
    fn device(&self) -> Self::Device;

    /// Concatenate several tensors to each other along dimension `dim`, in the order supplied
    fn cat(tensors: &[Self], dim: usize) -> Result<Self>;

    /// Slice a given `dimension` from `start` to `start + len`
    fn slice(&self, dimension: usize, start: usize, len: usize) -> Result<Self>;

    /// Slice a tensor into a vector of size `1` tensors along the supplied `dim`
    fn vectorize_dim(&self, dim: usize) -> Result<Vec<Self>>;
}

/// Integer tensors: token ids and attention masks.
pub trait IdOps: Backend {
    /// Build a `(rows, cols)` tensor from row-major `ids` on `device`
    fn from_ids(ids: Vec<i64>, rows: usize, cols: usize, device: &Self::Device) -> Result<Self>;
}

/// Float tensors: hidden states and logits.
pub trait FloatOps: Backend {
    /// Copy every element out in row-major order
    fn to_f32s(&self) -> Result<Vec<f32>>;
}

/// # Runtime
///
/// Names the tensor types one model works with. Runtimes are marker types and are
/// never instantiated.
///
/// ## Associated Types
///
/// * `Ids` - `(batch, seq)` token ids and attention masks
/// * `Floats` - encoder hidden states and `(batch, seq, vocab)` logits
/// * `Pixels` - image encoder input
///
/// All three share a device, so the loop can build id tensors next to the
/// encoder output it was handed.
pub trait Runtime: Send + Sync + 'static {
    type Device: Clone + Send + Sync;
    type Ids: IdOps<Device = Self::Device>;
    type Floats: FloatOps<Device = Self::Device>;
    type Pixels: Backend<Device = Self::Device>;
}

/// The id tensor type of runtime `R`.
pub type Ids<R> = <R as Runtime>::Ids;

/// The float tensor type of runtime `R`.
pub type Floats<R> = <R as Runtime>::Floats;

/// The image input type of runtime `R`.
pub type Pixels<R> = <R as Runtime>::Pixels;
