use crate::error::TensorError;
use crate::expression::Expression;
use nalgebra::Vector3;
use num_traits::ToPrimitive;

/// Concrete source and field positions for spot-checking a contracted
/// scalar against plain floating-point arithmetic.
#[derive(Debug, Clone, Copy)]
pub struct EvalPoint {
    pub source: Vector3<f64>,
    pub field: Vector3<f64>,
}

impl EvalPoint {
    pub fn new(source: Vector3<f64>, field: Vector3<f64>) -> Self {
        EvalPoint { source, field }
    }

    pub fn r(&self) -> f64 {
        self.field.norm()
    }

    pub fn ra(&self) -> f64 {
        self.source.norm()
    }

    /// x_a · n with n the unit field direction.
    pub fn dot(&self) -> f64 {
        self.source.dot(&self.field) / self.field.norm()
    }

    /// The exact 1/|x − x_a| the multipole series approximates.
    pub fn inverse_separation(&self) -> f64 {
        1.0 / (self.field - self.source).norm()
    }
}

/// Evaluate a fully contracted scalar expression at a point.
///
/// The symbolic path stays exact; this is a consumer-side check only.
pub fn eval_scalar(expr: &Expression, point: &EvalPoint) -> Result<f64, TensorError> {
    if !expr.is_scalar() {
        return Err(TensorError::NotScalar);
    }
    let r = point.r();
    let ra = point.ra();
    let dot = point.dot();
    let mut total = 0.0;
    for term in expr.terms() {
        let coeff = term.coeff.to_f64().unwrap_or(f64::NAN);
        total += coeff * r.powi(term.r_pow) * ra.powi(term.ra_pow) * dot.powi(term.dot_pow as i32);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{derivative_tensor, multipole_tensor};
    use crate::equivalence::potential;
    use crate::expression::Term;
    use crate::factor::Factor;
    use crate::types::IndexLabel;
    use num_rational::BigRational;
    use num_traits::One;

    fn point() -> EvalPoint {
        EvalPoint::new(Vector3::new(0.3, -0.2, 0.5), Vector3::new(4.0, 1.0, -8.0))
    }

    #[test]
    fn rejects_uncontracted_expressions() {
        let e = Expression::single(Term::new(
            BigRational::one(),
            vec![Factor::source(IndexLabel(1))],
        ));
        assert_eq!(eval_scalar(&e, &point()), Err(TensorError::NotScalar));
    }

    #[test]
    fn quadrupole_matches_the_closed_form() {
        let p = point();
        let phi = potential(&multipole_tensor(2).unwrap());
        let value = eval_scalar(&phi, &p).unwrap();
        let expected = (3.0 * p.dot().powi(2) - p.ra().powi(2)) / (2.0 * p.r().powi(3));
        assert!((value - expected).abs() < 1e-12, "{value} vs {expected}");
    }

    #[test]
    fn both_formulations_evaluate_identically() {
        let p = point();
        for n in 0..=5u32 {
            let via_q = eval_scalar(&potential(&multipole_tensor(n).unwrap()), &p).unwrap();
            let via_d = eval_scalar(&potential(&derivative_tensor(n).unwrap()), &p).unwrap();
            assert!(
                (via_q - via_d).abs() <= 1e-12 * via_q.abs().max(1.0),
                "n={n}: {via_q} vs {via_d}"
            );
        }
    }
}
