use std::fmt;

/// Names one leg of a rank-n tensor. Labels run 1..=n and are only ever
/// matched against each other, never evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexLabel(pub u32);

impl fmt::Display for IndexLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a vector-component factor.
///
/// The calculation only ever involves the fixed triple:
/// - `Source`: the source offset x_a,
/// - `Field`: the field point x,
/// - `Direction`: the unit vector n = x/r.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VectorKind {
    Source,
    Field,
    Direction,
}

impl VectorKind {
    /// Symbol used when printing, matching the conventional names
    /// x_a, x, n.
    pub fn symbol(&self) -> &'static str {
        match self {
            VectorKind::Source => "xa",
            VectorKind::Field => "x",
            VectorKind::Direction => "n",
        }
    }
}

/// Which of the two constructions a tensor expression came from.
///
/// `Moment` is the trace-subtracted Q tensor over source-offset legs;
/// `Derivative` is the n-th derivative tensor of 1/r over field-point
/// legs (times r^{2n+1}).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorKind {
    Moment,
    Derivative,
}

/// All leg labels 1..=n in ascending order.
pub fn leg_labels(n: u32) -> Vec<IndexLabel> {
    (1..=n).map(IndexLabel).collect()
}
