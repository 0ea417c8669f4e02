use thiserror::Error;

/// Errors surfaced by the tensor core.
///
/// The first two variants are domain violations rejected before any
/// work starts. `NotReduced` is a recoverable signal: the contraction
/// pass budget ran out while reducible factors remain, so the caller
/// should retry with a higher budget before reading the result as a
/// genuine mismatch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    #[error("pair count {k} exceeds floor({n}/2) for order {n}")]
    InvalidPairCount { n: u32, k: u32 },

    #[error("double factorial is only defined for odd arguments >= -1, got {0}")]
    DoubleFactorialDomain(i64),

    #[error("difference still reducible after {passes} contraction passes; retry with a higher pass bound")]
    NotReduced { passes: u32 },

    #[error("expression still carries tensor factors and cannot be evaluated numerically")]
    NotScalar,
}
