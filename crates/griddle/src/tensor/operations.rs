use super::constant::{BATCH_DIM, SEQ_DIM};
use crate::backend::{Backend, IdOps};
use crate::error::{GenerationError, Result};

/// Returns the size of dimension `dim`, failing if the tensor has fewer dimensions.
pub(crate) fn dim<B>(tensor: &B, dim: usize) -> Result<usize>
where B: Backend
{
    let shape = tensor.shape();
    shape.get(dim).copied().ok_or_else(|| {
        GenerationError::Shape(format!("dimension {} out of range for shape {:?}", dim, shape))
    })
}

/// Identifies batch indices where the sampled token equals `token`.
///
/// # Parameters
///
/// * `tokens` - One sampled token id per batch row
/// * `token` - The id to look for, typically the end-of-sequence token
///
/// # Returns
///
/// The row indices, in ascending order, whose token equals `token`.
pub(crate) fn where_equals_token(tokens: &[i64], token: i64) -> Vec<usize> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| **t == token)
        .map(|(idx, _)| idx)
        .collect()
}

/// A `(rows, cols)` id tensor with every element set to `value`.
pub(crate) fn filled<B>(value: i64, rows: usize, cols: usize, device: &B::Device) -> Result<B>
where B: IdOps
{
    B::from_ids(vec![value; rows * cols], rows, cols, device)
}

/// Appends one new value to the end of every row of a `(batch, seq)` tensor.
///
/// The input is left untouched; a new tensor of shape `(batch, seq + 1)` is built
/// by concatenating a `(batch, 1)` column along the sequence dimension.
///
/// # Parameters
///
/// * `input` - Tensor of shape `(batch, seq)`
/// * `column` - One value per row, in batch order
///
/// # Errors
///
/// Returns [`GenerationError::Shape`] if `column` does not hold one value per row.
pub(crate) fn append_column<B>(input: &B, column: Vec<i64>) -> Result<B>
where B: IdOps
{
    let batch = dim(input, BATCH_DIM)?;
    if column.len() != batch {
        return Err(GenerationError::Shape(format!(
            "expected {} values to append, got {}",
            batch,
            column.len()
        )));
    }
    let column = B::from_ids(column, batch, 1, &input.device())?;
    B::cat(&[input.clone(), column], SEQ_DIM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock_tensor::MockIds;

    #[test]
    fn test_where_equals_token() {
        assert_eq!(where_equals_token(&[2, 5, 2, 7], 2), vec![0, 2]);
        assert!(where_equals_token(&[1, 3], 2).is_empty());
    }

    #[test]
    fn test_append_column_grows_every_row() {
        let input = MockIds::new(vec![0, 4, 0, 6], [2, 2]).unwrap();
        let out = append_column(&input, vec![9, 8]).unwrap();
        assert_eq!(out.dims(), &[2, 3]);
        assert_eq!(out.data(), &[0, 4, 9, 0, 6, 8]);
        // the source tensor is not modified
        assert_eq!(input.dims(), &[2, 2]);
    }

    #[test]
    fn test_append_column_rejects_wrong_batch() {
        let input = MockIds::full(0, [2, 1]);
        assert!(append_column(&input, vec![1]).is_err());
    }

    #[test]
    fn test_filled_and_dim() {
        let ones: MockIds = filled(1, 2, 3, &()).unwrap();
        assert_eq!(ones.data(), &[1; 6]);
        assert_eq!(dim(&ones, 1).unwrap(), 3);
        assert!(dim(&ones, 2).is_err());
    }
}
