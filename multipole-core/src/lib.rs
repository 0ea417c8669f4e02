// Tensor subsystem: labels, factors, terms, and the pairing combinatorics
pub mod types;
pub mod factor;
pub mod expression;
pub mod pairing;

// Construction / reduction subsystem: coefficients, builders,
// contraction, and the equivalence check
pub mod coefficients;
pub mod builder;
pub mod contraction;
pub mod equivalence;

// Consumer-side helpers
pub mod error;
pub mod eval;

// Public tensor API
pub use crate::types::{leg_labels, IndexLabel, TensorKind, VectorKind};
pub use crate::factor::Factor;
pub use crate::expression::{Expression, Term, TermShape};
pub use crate::pairing::{generate_pairings, pairing_count, Pairing};

// Public construction / reduction API
pub use crate::coefficients::{factorial, signed_coefficient, CoeffCache};
pub use crate::builder::{derivative_tensor, multipole_tensor, TensorBuilder, TensorExpression};
pub use crate::contraction::{contract, contract_bounded, term_has_redex};
pub use crate::equivalence::{
    check_equivalent, check_equivalent_with_passes, equivalent_expressions, potential,
    recommended_passes, trace_over, BASE_PASS_BUDGET,
};

// Errors and numeric spot checks
pub use crate::error::TensorError;
pub use crate::eval::{eval_scalar, EvalPoint};
