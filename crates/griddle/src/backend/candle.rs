use super::{Backend, FloatOps, IdOps, Runtime};
use candle_core::{DType, Device, Tensor};
use crate::error::{GenerationError, Result};

impl From<candle_core::Error> for GenerationError {
    fn from(e: candle_core::Error) -> Self {
        GenerationError::Backend(e.to_string())
    }
}

/// Candle models: ids are `i64` tensors, and a single tensor type carries every dtype.
#[derive(Debug, Clone, Copy)]
pub struct Candle;

impl Runtime for Candle {
    type Device = Device;
    type Ids = Tensor;
    type Floats = Tensor;
    type Pixels = Tensor;
}

impl Backend for Tensor {
    type Device = Device;

    fn shape(&self) -> Vec<usize> {
        self.dims().to_vec()
    }

    fn device(&self) -> Self::Device {
        Tensor::device(self).clone()
    }

    fn cat(tensors: &[Self], dim: usize) -> Result<Self> {
        Ok(Tensor::cat(tensors, dim)?)
    }

    fn slice(&self, dimension: usize, start: usize, len: usize) -> Result<Self> {
        Ok(self.narrow(dimension, start, len)?)
    }

    fn vectorize_dim(&self, dim: usize) -> Result<Vec<Self>> {
        let size = self.dim(dim)?;
        (0..size)
            .map(|i| Ok(self.narrow(dim, i, 1)?))
            .collect()
    }
}

impl IdOps for Tensor {
    fn from_ids(ids: Vec<i64>, rows: usize, cols: usize, device: &Self::Device) -> Result<Self> {
        Ok(Tensor::from_vec(ids, (rows, cols), device)?)
    }
}

impl FloatOps for Tensor {
    fn to_f32s(&self) -> Result<Vec<f32>> {
        Ok(self.to_dtype(DType::F32)?.flatten_all()?.to_vec1::<f32>()?)
    }
}
