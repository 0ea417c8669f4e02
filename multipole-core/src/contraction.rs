use crate::expression::{Expression, Term};
use crate::factor::Factor;
use crate::types::VectorKind;
use num_bigint::BigInt;
use num_rational::BigRational;

/// The rewrite rules, in the order a pass tries them. Keeping the table
/// explicit makes each rule independently testable.
///
/// Every rule removes strictly more factors than it inserts, so the
/// pass loop reaches a fixed point in at most (total factor count)
/// passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    /// delta(a,a) → 3 (trace of the Kronecker delta over 3 components).
    DeltaTrace,
    /// delta(a,b)·delta(a,c) → delta(b,c); a fully shared pair leaves
    /// delta(b,b) for DeltaTrace.
    DeltaDelta,
    /// delta(a,b)·v(a) → v(b): the delta transports an index.
    DeltaTransport,
    /// Two vector components on the same leg reduce to a scalar:
    ///   xa·xa → ra²,  x·x → r²,  n·n → 1,
    ///   xa·n → dot,   x·n → r,   xa·x → r·dot   (x = r·n).
    VectorPair,
}

const RULES: [Rule; 4] = [
    Rule::DeltaTrace,
    Rule::DeltaDelta,
    Rule::DeltaTransport,
    Rule::VectorPair,
];

fn three() -> BigRational {
    BigRational::from_integer(BigInt::from(3))
}

/// Apply one rewrite of `rule` at the first matching site, if any.
fn apply_rule(term: &Term, rule: Rule) -> Option<Term> {
    match rule {
        Rule::DeltaTrace => {
            let i = term
                .factors
                .iter()
                .position(|f| matches!(f, Factor::Delta(a, b) if a == b))?;
            let mut out = term.clone();
            out.factors.remove(i);
            out.coeff *= three();
            Some(out)
        }
        Rule::DeltaDelta => {
            for i in 0..term.factors.len() {
                let Factor::Delta(a, b) = term.factors[i] else {
                    continue;
                };
                if a == b {
                    continue;
                }
                for j in (i + 1)..term.factors.len() {
                    let Factor::Delta(c, d) = term.factors[j] else {
                        continue;
                    };
                    let merged = if a == c && b == d {
                        Factor::delta(b, b)
                    } else if a == c {
                        Factor::delta(b, d)
                    } else if a == d {
                        Factor::delta(b, c)
                    } else if b == c {
                        Factor::delta(a, d)
                    } else if b == d {
                        Factor::delta(a, c)
                    } else {
                        continue;
                    };
                    let mut out = term.clone();
                    out.factors.remove(j);
                    out.factors.remove(i);
                    out.factors.push(merged);
                    out.canonicalize();
                    return Some(out);
                }
            }
            None
        }
        Rule::DeltaTransport => {
            for i in 0..term.factors.len() {
                let Factor::Delta(a, b) = term.factors[i] else {
                    continue;
                };
                if a == b {
                    continue;
                }
                for j in 0..term.factors.len() {
                    let Factor::Vector(leg, kind) = term.factors[j] else {
                        continue;
                    };
                    let target = if leg == a {
                        b
                    } else if leg == b {
                        a
                    } else {
                        continue;
                    };
                    let mut out = term.clone();
                    let (hi, lo) = if i > j { (i, j) } else { (j, i) };
                    out.factors.remove(hi);
                    out.factors.remove(lo);
                    out.factors.push(Factor::vector(target, kind));
                    out.canonicalize();
                    return Some(out);
                }
            }
            None
        }
        Rule::VectorPair => {
            for i in 0..term.factors.len() {
                let Factor::Vector(leg_a, kind_a) = term.factors[i] else {
                    continue;
                };
                for j in (i + 1)..term.factors.len() {
                    let Factor::Vector(leg_b, kind_b) = term.factors[j] else {
                        continue;
                    };
                    if leg_a != leg_b {
                        continue;
                    }
                    let mut out = term.clone();
                    out.factors.remove(j);
                    out.factors.remove(i);
                    let (lo, hi) = if kind_a <= kind_b {
                        (kind_a, kind_b)
                    } else {
                        (kind_b, kind_a)
                    };
                    match (lo, hi) {
                        (VectorKind::Source, VectorKind::Source) => out.ra_pow += 2,
                        (VectorKind::Field, VectorKind::Field) => out.r_pow += 2,
                        (VectorKind::Direction, VectorKind::Direction) => {}
                        (VectorKind::Source, VectorKind::Direction) => out.dot_pow += 1,
                        (VectorKind::Field, VectorKind::Direction) => out.r_pow += 1,
                        (VectorKind::Source, VectorKind::Field) => {
                            out.dot_pow += 1;
                            out.r_pow += 1;
                        }
                        _ => unreachable!("kinds are ordered"),
                    }
                    return Some(out);
                }
            }
            None
        }
    }
}

/// True if any rule still matches the term.
pub fn term_has_redex(term: &Term) -> bool {
    RULES.iter().any(|&rule| apply_rule(term, rule).is_some())
}

/// One pass: each rule applied at most once per term, then the
/// expression is re-normalized (like terms merged, zeros dropped).
fn contract_pass(expr: &Expression) -> (Expression, bool) {
    let mut changed = false;
    let terms = expr
        .terms()
        .iter()
        .map(|term| {
            let mut current = term.clone();
            for &rule in &RULES {
                if let Some(next) = apply_rule(&current, rule) {
                    current = next;
                    changed = true;
                }
            }
            current
        })
        .collect();
    (Expression::from_terms(terms), changed)
}

/// Contract to the fixed point: apply passes until one produces no
/// change. A single pass is not enough at higher orders — transporting
/// an index exposes a vector pair only the next pass can consume — so
/// the loop is load-bearing, not a safety net.
pub fn contract(expr: &Expression) -> Expression {
    let mut current = expr.clone();
    loop {
        let (next, changed) = contract_pass(&current);
        if !changed {
            return next;
        }
        current = next;
    }
}

/// Contract under a pass budget. Returns the (possibly partial) result
/// and whether the fixed point was reached within the budget.
pub fn contract_bounded(expr: &Expression, max_passes: u32) -> (Expression, bool) {
    let mut current = expr.clone();
    for _ in 0..max_passes {
        let (next, changed) = contract_pass(&current);
        current = next;
        if !changed {
            return (current, true);
        }
    }
    let reduced = !current.terms().iter().any(term_has_redex);
    (current, reduced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IndexLabel;
    use num_rational::BigRational;
    use num_traits::One;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn l(i: u32) -> IndexLabel {
        IndexLabel(i)
    }

    #[test]
    fn delta_trace_gives_three() {
        let e = Expression::single(Term::new(BigRational::one(), vec![Factor::delta(l(1), l(1))]));
        let c = contract(&e);
        assert_eq!(c.len(), 1);
        assert_eq!(c.terms()[0].coeff, rat(3));
        assert!(c.terms()[0].is_scalar());
    }

    #[test]
    fn delta_delta_merges_then_traces() {
        // delta(1,2)·delta(1,2) = delta(2,2) = 3
        let e = Expression::single(Term::new(
            BigRational::one(),
            vec![Factor::delta(l(1), l(2)), Factor::delta(l(1), l(2))],
        ));
        let c = contract(&e);
        assert_eq!(c.terms()[0].coeff, rat(3));
        assert!(c.is_scalar());

        // delta(1,2)·delta(2,3)·delta(3,1) = delta(1,1) = 3
        let ring = Expression::single(Term::new(
            BigRational::one(),
            vec![
                Factor::delta(l(1), l(2)),
                Factor::delta(l(2), l(3)),
                Factor::delta(l(3), l(1)),
            ],
        ));
        let c = contract(&ring);
        assert_eq!(c.terms()[0].coeff, rat(3));
        assert!(c.is_scalar());
    }

    #[test]
    fn transport_exposes_vector_pair() {
        // delta(1,2)·xa(1)·n(2): transport gives xa(2)·n(2), which the
        // pair rule then collapses to dot.
        let e = Expression::single(Term::new(
            BigRational::one(),
            vec![
                Factor::delta(l(1), l(2)),
                Factor::source(l(1)),
                Factor::direction(l(2)),
            ],
        ));
        let c = contract(&e);
        assert_eq!(c.len(), 1);
        let t = &c.terms()[0];
        assert!(t.is_scalar());
        assert_eq!(t.dot_pow, 1);
        assert!(t.coeff.is_one());
    }

    #[test]
    fn vector_pair_table() {
        let cases: Vec<(Vec<Factor>, (i32, i32, u32))> = vec![
            (vec![Factor::source(l(1)), Factor::source(l(1))], (0, 2, 0)),
            (vec![Factor::field(l(1)), Factor::field(l(1))], (2, 0, 0)),
            (vec![Factor::direction(l(1)), Factor::direction(l(1))], (0, 0, 0)),
            (vec![Factor::source(l(1)), Factor::direction(l(1))], (0, 0, 1)),
            (vec![Factor::field(l(1)), Factor::direction(l(1))], (1, 0, 0)),
            (vec![Factor::source(l(1)), Factor::field(l(1))], (1, 0, 1)),
        ];
        for (factors, (r_pow, ra_pow, dot_pow)) in cases {
            let label = format!("{:?}", factors);
            let c = contract(&Expression::single(Term::new(BigRational::one(), factors)));
            assert_eq!(c.len(), 1, "{label}");
            let t = &c.terms()[0];
            assert!(t.is_scalar(), "{label}");
            assert_eq!((t.r_pow, t.ra_pow, t.dot_pow), (r_pow, ra_pow, dot_pow), "{label}");
        }
    }

    #[test]
    fn contract_is_idempotent() {
        let e = Expression::from_terms(vec![
            Term::new(
                rat(3),
                vec![
                    Factor::delta(l(1), l(2)),
                    Factor::source(l(1)),
                    Factor::direction(l(2)),
                    Factor::source(l(3)),
                    Factor::direction(l(3)),
                ],
            ),
            Term::new(rat(-2), vec![Factor::delta(l(1), l(1))]),
        ]);
        let once = contract(&e);
        let twice = contract(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn bounded_contraction_reports_unreduced() {
        let e = Expression::single(Term::new(
            BigRational::one(),
            vec![
                Factor::delta(l(1), l(2)),
                Factor::source(l(1)),
                Factor::direction(l(2)),
            ],
        ));
        let (partial, reduced) = contract_bounded(&e, 0);
        assert_eq!(partial, e);
        assert!(!reduced);
        let (_, reduced) = contract_bounded(&e, 8);
        assert!(reduced);
    }

    #[test]
    fn free_indices_are_left_alone() {
        // delta(1,2) with nothing attached has no redex.
        let e = Expression::single(Term::new(
            BigRational::one(),
            vec![Factor::delta(l(1), l(2)), Factor::source(l(3))],
        ));
        let c = contract(&e);
        assert_eq!(c, e);
        assert!(!term_has_redex(&c.terms()[0]));
    }
}
