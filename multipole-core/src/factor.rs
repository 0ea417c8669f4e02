use crate::types::{IndexLabel, VectorKind};
use std::fmt;

/// One multiplicative factor of a tensor term: either a Kronecker delta
/// joining two legs, or a single vector component on one leg.
///
/// Deltas are unordered; the constructor stores the smaller label first
/// so that structurally equal factors compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Factor {
    Delta(IndexLabel, IndexLabel),
    Vector(IndexLabel, VectorKind),
}

impl Factor {
    pub fn delta(a: IndexLabel, b: IndexLabel) -> Self {
        if b < a {
            Factor::Delta(b, a)
        } else {
            Factor::Delta(a, b)
        }
    }

    pub fn vector(leg: IndexLabel, kind: VectorKind) -> Self {
        Factor::Vector(leg, kind)
    }

    pub fn source(leg: IndexLabel) -> Self {
        Factor::Vector(leg, VectorKind::Source)
    }

    pub fn field(leg: IndexLabel) -> Self {
        Factor::Vector(leg, VectorKind::Field)
    }

    pub fn direction(leg: IndexLabel) -> Self {
        Factor::Vector(leg, VectorKind::Direction)
    }

    /// True if the factor touches the given leg label.
    pub fn involves(&self, leg: IndexLabel) -> bool {
        match *self {
            Factor::Delta(a, b) => a == leg || b == leg,
            Factor::Vector(l, _) => l == leg,
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Factor::Delta(a, b) => write!(f, "delta({},{})", a, b),
            Factor::Vector(leg, kind) => write!(f, "{}({})", kind.symbol(), leg),
        }
    }
}
