use crate::factor::Factor;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::collections::BTreeMap;
use std::fmt;

/// One additive term: an exact rational coefficient times powers of the
/// residual scalars times a multiset of tensor factors.
///
/// The residual scalars are the radial magnitudes r = |x| and ra = |x_a|
/// (signed exponents; the potentials carry negative powers of r) and the
/// projection dot = x_a·n left behind by contraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub coeff: BigRational,
    pub r_pow: i32,
    pub ra_pow: i32,
    pub dot_pow: u32,
    pub factors: Vec<Factor>,
}

/// Everything of a term except its coefficient. Terms with equal shapes
/// are merged by adding coefficients.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermShape {
    pub r_pow: i32,
    pub ra_pow: i32,
    pub dot_pow: u32,
    pub factors: Vec<Factor>,
}

impl Term {
    pub fn new(coeff: BigRational, factors: Vec<Factor>) -> Self {
        let mut term = Term {
            coeff,
            r_pow: 0,
            ra_pow: 0,
            dot_pow: 0,
            factors,
        };
        term.canonicalize();
        term
    }

    /// The scalar unit term.
    pub fn one() -> Self {
        Term::new(BigRational::one(), Vec::new())
    }

    pub fn from_int(value: i64) -> Self {
        Term::new(BigRational::from_integer(BigInt::from(value)), Vec::new())
    }

    /// Sort the factor multiset so structurally equal terms compare equal.
    pub fn canonicalize(&mut self) {
        self.factors.sort();
    }

    pub fn shape(&self) -> TermShape {
        TermShape {
            r_pow: self.r_pow,
            ra_pow: self.ra_pow,
            dot_pow: self.dot_pow,
            factors: self.factors.clone(),
        }
    }

    /// Number of vector-component factors still attached to the term.
    pub fn vector_leg_count(&self) -> usize {
        self.factors
            .iter()
            .filter(|f| matches!(f, Factor::Vector(_, _)))
            .count()
    }

    pub fn delta_count(&self) -> usize {
        self.factors
            .iter()
            .filter(|f| matches!(f, Factor::Delta(_, _)))
            .count()
    }

    /// A fully contracted term carries no factors, only scalars.
    pub fn is_scalar(&self) -> bool {
        self.factors.is_empty()
    }

    fn write_body(&self, f: &mut fmt::Formatter<'_>, coeff: &BigRational) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if !coeff.is_one() || (self.factors.is_empty() && self.r_pow == 0 && self.ra_pow == 0 && self.dot_pow == 0)
        {
            if coeff.is_integer() {
                parts.push(coeff.to_integer().to_string());
            } else {
                parts.push(format!("{}/{}", coeff.numer(), coeff.denom()));
            }
        }
        if self.dot_pow == 1 {
            parts.push("dot".into());
        } else if self.dot_pow > 1 {
            parts.push(format!("dot^{}", self.dot_pow));
        }
        if self.ra_pow == 1 {
            parts.push("ra".into());
        } else if self.ra_pow != 0 {
            parts.push(format!("ra^{}", self.ra_pow));
        }
        if self.r_pow == 1 {
            parts.push("r".into());
        } else if self.r_pow != 0 {
            parts.push(format!("r^{}", self.r_pow));
        }
        for factor in &self.factors {
            parts.push(factor.to_string());
        }
        write!(f, "{}", parts.join("*"))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.coeff.is_negative() {
            write!(f, "-")?;
        }
        self.write_body(f, &self.coeff.abs())
    }
}

/// An unordered sum of terms kept in canonical form: like terms merged,
/// zero terms dropped, deterministic (shape-sorted) order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Expression {
    terms: Vec<Term>,
}

impl Expression {
    pub fn zero() -> Self {
        Expression { terms: Vec::new() }
    }

    pub fn from_terms(terms: Vec<Term>) -> Self {
        let mut merged: BTreeMap<TermShape, BigRational> = BTreeMap::new();
        for term in terms {
            let mut term = term;
            term.canonicalize();
            let entry = merged.entry(term.shape()).or_insert_with(BigRational::zero);
            *entry += term.coeff;
        }
        let terms = merged
            .into_iter()
            .filter(|(_, coeff)| !coeff.is_zero())
            .map(|(shape, coeff)| Term {
                coeff,
                r_pow: shape.r_pow,
                ra_pow: shape.ra_pow,
                dot_pow: shape.dot_pow,
                factors: shape.factors,
            })
            .collect();
        Expression { terms }
    }

    pub fn single(term: Term) -> Self {
        Expression::from_terms(vec![term])
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn into_terms(self) -> Vec<Term> {
        self.terms
    }

    pub fn add(&self, other: &Expression) -> Expression {
        let mut terms = self.terms.clone();
        terms.extend(other.terms.iter().cloned());
        Expression::from_terms(terms)
    }

    pub fn neg(&self) -> Expression {
        let terms = self
            .terms
            .iter()
            .map(|t| {
                let mut t = t.clone();
                t.coeff = -t.coeff;
                t
            })
            .collect();
        Expression { terms }
    }

    pub fn sub(&self, other: &Expression) -> Expression {
        self.add(&other.neg())
    }

    /// Rebuild each term through `f` and re-normalize.
    pub fn map_terms<F>(&self, f: F) -> Expression
    where
        F: Fn(&Term) -> Term,
    {
        Expression::from_terms(self.terms.iter().map(f).collect())
    }

    /// True when every term is a bare scalar (no factors left).
    pub fn is_scalar(&self) -> bool {
        self.terms.iter().all(Term::is_scalar)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, term) in self.terms.iter().enumerate() {
            if i == 0 {
                write!(f, "{}", term)?;
            } else if term.coeff.is_negative() {
                write!(f, " - ")?;
                term.write_body(f, &term.coeff.abs())?;
            } else {
                write!(f, " + ")?;
                term.write_body(f, &term.coeff)?;
            }
        }
        Ok(())
    }
}
