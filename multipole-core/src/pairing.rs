use crate::error::TensorError;
use crate::types::{leg_labels, IndexLabel};
use num_bigint::BigInt;
use num_traits::One;

/// A partition of the legs {1..n} into k disjoint pairs plus the
/// remaining legs in ascending order. Each pair stores the smaller
/// label first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pairing {
    pub pairs: Vec<(IndexLabel, IndexLabel)>,
    pub leftovers: Vec<IndexLabel>,
}

impl Pairing {
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }
}

/// Enumerate every way to partition {1..n} into k disjoint pairs plus
/// n − 2k leftovers, each exactly once.
///
/// Recursion on the smallest remaining label ℓ: leave ℓ unpaired (when
/// enough labels remain for the outstanding pairs), or pair ℓ with each
/// later label in turn and recurse with one pair less. Fixing ℓ as the
/// first endpoint of its pair is what makes the traversal canonical —
/// a matching can never be reached along two different branches.
pub fn generate_pairings(n: u32, k: u32) -> Result<Vec<Pairing>, TensorError> {
    if 2 * k > n {
        return Err(TensorError::InvalidPairCount { n, k });
    }
    let labels = leg_labels(n);
    let mut out = Vec::new();
    let mut pairs = Vec::with_capacity(k as usize);
    let mut leftovers = Vec::with_capacity((n - 2 * k) as usize);
    recurse(&labels, k, &mut pairs, &mut leftovers, &mut out);
    Ok(out)
}

fn recurse(
    available: &[IndexLabel],
    k: u32,
    pairs: &mut Vec<(IndexLabel, IndexLabel)>,
    leftovers: &mut Vec<IndexLabel>,
    out: &mut Vec<Pairing>,
) {
    if (available.len() as u32) < 2 * k {
        // Branch cannot complete the outstanding pairs.
        return;
    }
    if available.is_empty() {
        out.push(Pairing {
            pairs: pairs.clone(),
            leftovers: leftovers.clone(),
        });
        return;
    }
    let smallest = available[0];
    let rest = &available[1..];

    // Smallest label stays unpaired.
    if rest.len() as u32 >= 2 * k {
        leftovers.push(smallest);
        recurse(rest, k, pairs, leftovers, out);
        leftovers.pop();
    }

    // Smallest label opens a pair with each later label in turn.
    if k > 0 {
        for i in 0..rest.len() {
            let partner = rest[i];
            let mut reduced = Vec::with_capacity(rest.len() - 1);
            reduced.extend_from_slice(&rest[..i]);
            reduced.extend_from_slice(&rest[i + 1..]);
            pairs.push((smallest, partner));
            recurse(&reduced, k - 1, pairs, leftovers, out);
            pairs.pop();
        }
    }
}

/// n! / (2^k · k! · (n−2k)!), the exact number of pairings for (n, k).
pub fn pairing_count(n: u32, k: u32) -> Result<BigInt, TensorError> {
    if 2 * k > n {
        return Err(TensorError::InvalidPairCount { n, k });
    }
    let fact = |m: u32| -> BigInt { (1..=i64::from(m)).map(BigInt::from).product() };
    let denom = (BigInt::one() << (k as usize)) * fact(k) * fact(n - 2 * k);
    Ok(fact(n) / denom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn rejects_too_many_pairs() {
        assert!(matches!(
            generate_pairings(3, 2),
            Err(TensorError::InvalidPairCount { n: 3, k: 2 })
        ));
        assert!(pairing_count(5, 3).is_err());
    }

    #[test]
    fn zero_pairs_yields_identity_partition() {
        let pairings = generate_pairings(4, 0).unwrap();
        assert_eq!(pairings.len(), 1);
        assert!(pairings[0].pairs.is_empty());
        assert_eq!(pairings[0].leftovers, leg_labels(4));
    }

    #[test]
    fn order_zero_has_the_empty_pairing() {
        let pairings = generate_pairings(0, 0).unwrap();
        assert_eq!(pairings.len(), 1);
        assert!(pairings[0].pairs.is_empty());
        assert!(pairings[0].leftovers.is_empty());
    }

    #[test]
    fn known_small_counts() {
        for (n, k, expected) in [
            (2, 1, 1usize),
            (3, 1, 3),
            (4, 1, 6),
            (4, 2, 3),
            (5, 2, 15),
            (6, 2, 45),
            (6, 3, 15),
        ] {
            let pairings = generate_pairings(n, k).unwrap();
            assert_eq!(pairings.len(), expected, "n={n} k={k}");
        }
    }

    #[test]
    fn counts_match_formula_up_to_n_10() {
        for n in 0..=10u32 {
            for k in 0..=(n / 2) {
                let generated = generate_pairings(n, k).unwrap().len();
                let expected = pairing_count(n, k).unwrap();
                assert_eq!(BigInt::from(generated), expected, "n={n} k={k}");
            }
        }
    }

    #[test]
    fn pairings_are_distinct_and_cover_all_labels() {
        let n = 7;
        for k in 0..=3u32 {
            let pairings = generate_pairings(n, k).unwrap();
            let unique: HashSet<_> = pairings.iter().cloned().collect();
            assert_eq!(unique.len(), pairings.len());
            for p in &pairings {
                let mut seen: Vec<IndexLabel> = Vec::new();
                for &(a, b) in &p.pairs {
                    assert!(a < b);
                    seen.push(a);
                    seen.push(b);
                }
                assert!(p.leftovers.windows(2).all(|w| w[0] < w[1]));
                seen.extend_from_slice(&p.leftovers);
                seen.sort();
                assert_eq!(seen, leg_labels(n));
            }
        }
    }
}
