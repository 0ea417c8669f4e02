use crate::coefficients::{signed_coefficient, CoeffCache};
use crate::error::TensorError;
use crate::expression::{Expression, Term};
use crate::factor::Factor;
use crate::pairing::{generate_pairings, Pairing};
use crate::types::{TensorKind, VectorKind};
use num_bigint::BigInt;
use num_rational::BigRational;

/// A rank-n tensor expression together with the construction it came
/// from. Before contraction every term represents one component pattern
/// of the rank-n tensor: n − 2·(delta count) vector legs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorExpression {
    pub order: u32,
    pub kind: TensorKind,
    pub expr: Expression,
}

impl TensorExpression {
    /// Check the rank bookkeeping invariant on every term.
    pub fn is_well_formed(&self) -> bool {
        self.expr.terms().iter().all(|t| {
            t.vector_leg_count() + 2 * t.delta_count() == self.order as usize
        })
    }
}

/// Assembles both tensor constructions, sharing one coefficient cache.
#[derive(Debug, Default)]
pub struct TensorBuilder {
    coeffs: CoeffCache,
}

impl TensorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(coeffs: CoeffCache) -> Self {
        TensorBuilder { coeffs }
    }

    /// One trace term for one pairing: coefficient
    /// (−1)^k · (2n−2k−1)!!, the radial magnitude squared per pair, a
    /// delta per pair and a vector component per leftover leg.
    ///
    /// The same formula serves both constructions; only the vector
    /// identity (and the radial magnitude that goes with it) differs.
    pub fn trace_term(
        &mut self,
        n: u32,
        pairing: &Pairing,
        kind: VectorKind,
    ) -> Result<Term, TensorError> {
        let k = pairing.pair_count() as u32;
        let dfact = self.coeffs.double_factorial(2 * i64::from(n) - 2 * i64::from(k) - 1)?;
        let coeff = BigRational::from_integer(BigInt::from(signed_coefficient(k)) * dfact);

        let mut factors = Vec::with_capacity(pairing.pairs.len() + pairing.leftovers.len());
        for &(a, b) in &pairing.pairs {
            factors.push(Factor::delta(a, b));
        }
        for &leg in &pairing.leftovers {
            factors.push(Factor::vector(leg, kind));
        }

        let mut term = Term::new(coeff, factors);
        match kind {
            VectorKind::Source => term.ra_pow = 2 * k as i32,
            VectorKind::Field | VectorKind::Direction => term.r_pow = 2 * k as i32,
        }
        Ok(term)
    }

    fn assemble(
        &mut self,
        n: u32,
        kind: VectorKind,
        negate_odd_orders: bool,
    ) -> Result<Expression, TensorError> {
        let mut terms = Vec::new();
        for k in 0..=(n / 2) {
            for pairing in generate_pairings(n, k)? {
                let mut term = self.trace_term(n, &pairing, kind)?;
                if negate_odd_orders && n % 2 == 1 {
                    term.coeff = -term.coeff;
                }
                terms.push(term);
            }
        }
        Ok(Expression::from_terms(terms))
    }

    /// The symmetric traceless moment tensor Q over source-offset legs:
    ///
    ///   Q = Σ_k (−1)^k (2n−2k−1)!! |x_a|^{2k} Σ_pairings δ… x_a…
    pub fn multipole_tensor(&mut self, n: u32) -> Result<TensorExpression, TensorError> {
        let expr = self.assemble(n, VectorKind::Source, false)?;
        Ok(TensorExpression {
            order: n,
            kind: TensorKind::Moment,
            expr,
        })
    }

    /// The n-th derivative tensor D of 1/r over field-point legs, scaled
    /// by r^{2n+1}: same traversal with an overall (−1)^n, so that
    /// ∂^n(1/r) = D / r^{2n+1}.
    pub fn derivative_tensor(&mut self, n: u32) -> Result<TensorExpression, TensorError> {
        let expr = self.assemble(n, VectorKind::Field, true)?;
        Ok(TensorExpression {
            order: n,
            kind: TensorKind::Derivative,
            expr,
        })
    }

    pub fn cache(&self) -> &CoeffCache {
        &self.coeffs
    }
}

/// Convenience entry point with a fresh cache.
pub fn multipole_tensor(n: u32) -> Result<TensorExpression, TensorError> {
    TensorBuilder::new().multipole_tensor(n)
}

/// Convenience entry point with a fresh cache.
pub fn derivative_tensor(n: u32) -> Result<TensorExpression, TensorError> {
    TensorBuilder::new().derivative_tensor(n)
}
