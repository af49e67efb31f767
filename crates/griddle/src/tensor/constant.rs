//! # Constants with reserved meanings in griddle

/// In a given tensor shape, griddle reserves the `0th` dimension for batching
pub const BATCH_DIM: usize = 0;

/// In a given tensor shape, griddle reserves the `1st` dimension for sequence
pub const SEQ_DIM: usize = 1;

/// Logits carry the vocabulary in their `2nd` dimension
pub const VOCAB_DIM: usize = 2;
