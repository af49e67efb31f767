use std::fmt::Debug;
use super::{Backend, FloatOps, IdOps, Runtime};
use crate::error::{GenerationError, Result};

// A row-major, host-only tensor for testing
#[derive(Clone, Debug, PartialEq)]
pub struct MockTensor<T> {
    pub(crate) dims: Vec<usize>,
    pub(crate) data: Vec<T>,
}

pub type MockIds = MockTensor<i64>;
pub type MockFloats = MockTensor<f32>;

/// Runtime whose tensors are all [`MockTensor`]s on a unit device.
#[derive(Debug, Clone, Copy)]
pub struct MockRuntime;

impl Runtime for MockRuntime {
    type Device = ();
    type Ids = MockIds;
    type Floats = MockFloats;
    type Pixels = MockFloats;
}

fn numel(dims: &[usize]) -> usize {
    dims.iter().product()
}

fn dim_of(dims: &[usize], dim: usize) -> Result<usize> {
    dims.get(dim).copied().ok_or_else(|| {
        GenerationError::Shape(format!("dimension {} out of range for shape {:?}", dim, dims))
    })
}

impl<T: Copy> MockTensor<T> {
    pub fn new(data: Vec<T>, dims: impl Into<Vec<usize>>) -> Result<Self> {
        let dims = dims.into();
        if numel(&dims) != data.len() {
            return Err(GenerationError::Shape(format!(
                "{} elements cannot be laid out as {:?}",
                data.len(),
                dims
            )));
        }
        Ok(Self { dims, data })
    }

    pub fn full(value: T, dims: impl Into<Vec<usize>>) -> Self {
        let dims = dims.into();
        let data = vec![value; numel(&dims)];
        Self { dims, data }
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    fn chunk(&self, begin: usize, len: usize) -> Result<&[T]> {
        self.data.get(begin..begin + len).ok_or_else(|| {
            GenerationError::Shape(format!("buffer of {} does not match {:?}", self.data.len(), self.dims))
        })
    }
}

impl<T> Backend for MockTensor<T>
where T: Copy + Debug + Send + Sync + 'static
{
    type Device = ();

    fn shape(&self) -> Vec<usize> {
        self.dims.clone()
    }

    fn device(&self) -> Self::Device {}

    fn cat(tensors: &[Self], dim: usize) -> Result<Self> {
        let first = tensors
            .first()
            .ok_or_else(|| GenerationError::Shape("cannot concatenate zero tensors".into()))?;
        dim_of(&first.dims, dim)?;

        let mut dims = first.dims.clone();
        dims[dim] = 0;
        for tensor in tensors {
            let compatible = tensor.dims.len() == first.dims.len()
                && tensor
                    .dims
                    .iter()
                    .zip(first.dims.iter())
                    .enumerate()
                    .all(|(i, (a, b))| i == dim || a == b);
            if !compatible {
                return Err(GenerationError::Shape(format!(
                    "cannot concatenate {:?} with {:?} along dimension {}",
                    first.dims, tensor.dims, dim
                )));
            }
            dims[dim] += tensor.dims[dim];
        }

        let outer = numel(&dims[..dim]);
        let inner = numel(&dims[dim + 1..]);
        let mut data = Vec::with_capacity(numel(&dims));
        for o in 0..outer {
            for tensor in tensors {
                let chunk = tensor.dims[dim] * inner;
                data.extend_from_slice(tensor.chunk(o * chunk, chunk)?);
            }
        }
        Ok(Self { dims, data })
    }

    fn slice(&self, dimension: usize, start: usize, len: usize) -> Result<Self> {
        let size = dim_of(&self.dims, dimension)?;
        if start + len > size {
            return Err(GenerationError::Shape(format!(
                "range {}..{} out of bounds for dimension {} of size {}",
                start,
                start + len,
                dimension,
                size
            )));
        }
        let outer = numel(&self.dims[..dimension]);
        let inner = numel(&self.dims[dimension + 1..]);
        let mut data = Vec::with_capacity(outer * len * inner);
        for o in 0..outer {
            data.extend_from_slice(self.chunk((o * size + start) * inner, len * inner)?);
        }
        let mut dims = self.dims.clone();
        dims[dimension] = len;
        Ok(Self { dims, data })
    }

    fn vectorize_dim(&self, dim: usize) -> Result<Vec<Self>> {
        (0..dim_of(&self.dims, dim)?).map(|i| self.slice(dim, i, 1)).collect()
    }
}

impl IdOps for MockIds {
    fn from_ids(ids: Vec<i64>, rows: usize, cols: usize, _device: &()) -> Result<Self> {
        MockTensor::new(ids, [rows, cols])
    }
}

impl FloatOps for MockFloats {
    fn to_f32s(&self) -> Result<Vec<f32>> {
        Ok(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cat_along_sequence_dimension() {
        let a = MockIds::new(vec![1, 2, 3, 4], [2, 2]).unwrap();
        let b = MockIds::new(vec![9, 8], [2, 1]).unwrap();
        let c = MockIds::cat(&[a, b], 1).unwrap();
        assert_eq!(c.dims(), &[2, 3]);
        assert_eq!(c.data(), &[1, 2, 9, 3, 4, 8]);
    }

    #[test]
    fn test_slice_last_position() {
        let t = MockFloats::new(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0], [2, 2, 2]).unwrap();
        let last = t.slice(1, 1, 1).unwrap();
        assert_eq!(last.dims(), &[2, 1, 2]);
        assert_eq!(last.data(), &[2.0, 3.0, 6.0, 7.0]);
        assert!(t.slice(1, 1, 2).is_err());
    }

    #[test]
    fn test_inconsistent_buffer_is_shape_error() {
        let t = MockFloats { dims: vec![2, 1, 3], data: vec![0.0] };
        assert!(matches!(t.slice(1, 0, 1), Err(GenerationError::Shape(_))));
    }
}
