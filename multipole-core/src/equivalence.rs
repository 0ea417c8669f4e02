use crate::coefficients::{factorial, signed_coefficient};
use crate::builder::TensorExpression;
use crate::contraction::{contract, contract_bounded, term_has_redex};
use crate::error::TensorError;
use crate::expression::Expression;
use crate::factor::Factor;
use crate::types::{leg_labels, IndexLabel, TensorKind};
use num_bigint::BigInt;
use num_rational::BigRational;

/// Empirical floor for the contraction pass budget.
pub const BASE_PASS_BUDGET: u32 = 5;

/// Pass budget that reliably reaches the fixed point for order n.
pub fn recommended_passes(n: u32) -> u32 {
    BASE_PASS_BUDGET.max(n + 2)
}

/// Multiply the tensor by its conjugate legs and normalization, giving
/// the (uncontracted) n-th potential term:
///
///   Moment:     (1/n!)      Q ⊗ n(1)…n(n)    / r^{n+1}
///   Derivative: ((−1)^n/n!) x_a(1)…x_a(n) ⊗ D / r^{2n+1}
///
/// Both reduce to the same scalar — that is the equivalence this crate
/// exists to check.
fn assemble_potential(tensor: &TensorExpression) -> Expression {
    let n = tensor.order;
    let n_fact = BigRational::from_integer(factorial(n));
    let (conjugate, scale, r_shift): (fn(IndexLabel) -> Factor, BigRational, i32) =
        match tensor.kind {
            TensorKind::Moment => (
                Factor::direction,
                n_fact.recip(),
                -(n as i32 + 1),
            ),
            TensorKind::Derivative => (
                Factor::source,
                BigRational::from_integer(BigInt::from(signed_coefficient(n))) / n_fact,
                -(2 * n as i32 + 1),
            ),
        };
    tensor.expr.map_terms(|term| {
        let mut out = term.clone();
        for leg in leg_labels(n) {
            out.factors.push(conjugate(leg));
        }
        out.canonicalize();
        out.coeff *= scale.clone();
        out.r_pow += r_shift;
        out
    })
}

/// The fully contracted potential term of the given construction.
pub fn potential(tensor: &TensorExpression) -> Expression {
    contract(&assemble_potential(tensor))
}

/// Compare two already-contracted (or partially contracted) scalar
/// expressions under a pass budget.
///
/// A non-zero difference whose every term is still reducible is a
/// NotReduced signal — the budget, not the mathematics, ran out.
pub fn equivalent_expressions(
    a: &Expression,
    b: &Expression,
    passes: u32,
) -> Result<bool, TensorError> {
    let diff = a.sub(b);
    let (residual, reduced) = contract_bounded(&diff, passes);
    if residual.is_zero() {
        return Ok(true);
    }
    if !reduced && residual.terms().iter().all(term_has_redex) {
        return Err(TensorError::NotReduced { passes });
    }
    Ok(false)
}

/// Check that two constructions define the same potential term, with a
/// budget that suits their order.
pub fn check_equivalent(a: &TensorExpression, b: &TensorExpression) -> Result<bool, TensorError> {
    check_equivalent_with_passes(a, b, recommended_passes(a.order.max(b.order)))
}

/// As `check_equivalent`, with an explicit pass budget everywhere
/// (assembly and difference alike). Callers that hit NotReduced retry
/// with a higher budget.
pub fn check_equivalent_with_passes(
    a: &TensorExpression,
    b: &TensorExpression,
    passes: u32,
) -> Result<bool, TensorError> {
    let (pa, _) = contract_bounded(&assemble_potential(a), passes);
    let (pb, _) = contract_bounded(&assemble_potential(b), passes);
    equivalent_expressions(&pa, &pb, passes)
}

/// Contract one pair of legs of the tensor through a delta. For the
/// moment tensor this must reduce to zero whenever n ≥ 2.
pub fn trace_over(tensor: &TensorExpression, a: IndexLabel, b: IndexLabel) -> Expression {
    let traced = tensor.expr.map_terms(|term| {
        let mut out = term.clone();
        out.factors.push(Factor::delta(a, b));
        out.canonicalize();
        out
    });
    contract(&traced)
}
