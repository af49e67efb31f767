//! The burn implementation for backend provision.
//! Since burn tensors are constrained with const generics, we macro apply the
//! core operations for each supported rank.
use std::marker::PhantomData;
use super::{Backend, FloatOps, IdOps, Runtime};
use burn::prelude::{Backend as BurnBackend, Tensor};
use burn::tensor::{BasicOps, Float, Int, TensorData};
use crate::error::{GenerationError, Result};

/// Burn models on backend `B`: ids are rank 2 `Int` tensors, hidden states and
/// logits rank 3 `Float` tensors, and images rank 4 `Float` tensors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Burn<B>(PhantomData<B>);

impl<B> Runtime for Burn<B>
where B: BurnBackend
{
    type Device = B::Device;
    type Ids = Tensor<B, 2, Int>;
    type Floats = Tensor<B, 3, Float>;
    type Pixels = Tensor<B, 4, Float>;
}

fn check_dim(dims: &[usize], dim: usize) -> Result<usize> {
    dims.get(dim).copied().ok_or_else(|| {
        GenerationError::Shape(format!("dimension {} out of range for shape {:?}", dim, dims))
    })
}

// burn panics on invalid shapes, so everything is checked up front
fn check_cat(shapes: &[Vec<usize>], dim: usize) -> Result<()> {
    let first = shapes
        .first()
        .ok_or_else(|| GenerationError::Shape("cannot concatenate zero tensors".into()))?;
    check_dim(first, dim)?;
    for shape in shapes {
        let compatible = shape
            .iter()
            .zip(first.iter())
            .enumerate()
            .all(|(i, (a, b))| i == dim || a == b);
        if !compatible {
            return Err(GenerationError::Shape(format!(
                "cannot concatenate {:?} with {:?} along dimension {}",
                first, shape, dim
            )));
        }
    }
    Ok(())
}

macro_rules! impl_core_tensor_ops {
    ($d:literal) => {
        impl<B, K> Backend for Tensor<B, $d, K>
        where
            B: BurnBackend,
            K: BasicOps<B> + 'static,
        {
            type Device = B::Device;

            fn shape(&self) -> Vec<usize> {
                self.dims().to_vec()
            }

            fn device(&self) -> Self::Device {
                Tensor::device(self)
            }

            fn cat(tensors: &[Self], dim: usize) -> Result<Self> {
                let shapes: Vec<_> = tensors.iter().map(|t| t.dims().to_vec()).collect();
                check_cat(&shapes, dim)?;
                Ok(Tensor::cat(tensors.to_vec(), dim))
            }

            fn slice(&self, dimension: usize, start: usize, len: usize) -> Result<Self> {
                let size = check_dim(&self.dims(), dimension)?;
                if start + len > size {
                    return Err(GenerationError::Shape(format!(
                        "range {}..{} out of bounds for dimension {} of size {}",
                        start,
                        start + len,
                        dimension,
                        size
                    )));
                }
                Ok(self.clone().narrow(dimension, start, len))
            }

            fn vectorize_dim(&self, dim: usize) -> Result<Vec<Self>> {
                let size = check_dim(&self.dims(), dim)?;
                if size == 0 {
                    return Ok(vec![]);
                }
                Ok(self.clone().chunk(size, dim))
            }
        }
    };
}

macro_rules! impl_float_ops {
    ($d:literal) => {
        impl<B> FloatOps for Tensor<B, $d, Float>
        where B: BurnBackend
        {
            fn to_f32s(&self) -> Result<Vec<f32>> {
                self.to_data()
                    .convert::<f32>()
                    .to_vec::<f32>()
                    .map_err(|e| GenerationError::Backend(format!("{:?}", e)))
            }
        }
    };
}

impl_core_tensor_ops!(1);
impl_core_tensor_ops!(2);
impl_core_tensor_ops!(3);
impl_core_tensor_ops!(4);

impl_float_ops!(1);
impl_float_ops!(2);
impl_float_ops!(3);
impl_float_ops!(4);

impl<B> IdOps for Tensor<B, 2, Int>
where B: BurnBackend
{
    fn from_ids(ids: Vec<i64>, rows: usize, cols: usize, device: &Self::Device) -> Result<Self> {
        if ids.len() != rows * cols {
            return Err(GenerationError::Shape(format!(
                "{} ids cannot be laid out as ({}, {})",
                ids.len(),
                rows,
                cols
            )));
        }
        Ok(Tensor::from_data(TensorData::new(ids, [rows, cols]), device))
    }
}
