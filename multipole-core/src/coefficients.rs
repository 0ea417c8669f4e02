use crate::error::TensorError;
use num_bigint::BigInt;
use num_traits::One;
use std::collections::HashMap;

/// Memo table for the double factorials that appear as trace-term
/// coefficients.
///
/// The cache is an explicit value handed to the builders rather than
/// process-global state, so callers (and tests) control its lifetime.
#[derive(Debug, Clone, Default)]
pub struct CoeffCache {
    memo: HashMap<i64, BigInt>,
}

impl CoeffCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// m!! = m·(m−2)·…·3·1 for odd m ≥ 1, with (−1)!! = 1 (the empty
    /// product, needed for the fully paired k = n/2 term).
    ///
    /// Even or smaller arguments never arise from a valid (n, k) and are
    /// rejected.
    pub fn double_factorial(&mut self, m: i64) -> Result<BigInt, TensorError> {
        if m < -1 || m % 2 == 0 {
            return Err(TensorError::DoubleFactorialDomain(m));
        }
        if m <= 1 {
            return Ok(BigInt::one());
        }
        if let Some(value) = self.memo.get(&m) {
            return Ok(value.clone());
        }
        let value = BigInt::from(m) * self.double_factorial(m - 2)?;
        self.memo.insert(m, value.clone());
        Ok(value)
    }

    pub fn cached_len(&self) -> usize {
        self.memo.len()
    }
}

/// The alternating sign (−1)^k attached to a k-pair trace correction.
pub fn signed_coefficient(k: u32) -> i64 {
    if k % 2 == 0 {
        1
    } else {
        -1
    }
}

/// n! as a BigInt; used by the potential normalization 1/n!.
pub fn factorial(n: u32) -> BigInt {
    (1..=i64::from(n)).map(BigInt::from).product()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values() {
        let mut cache = CoeffCache::new();
        assert_eq!(cache.double_factorial(-1).unwrap(), BigInt::from(1));
        assert_eq!(cache.double_factorial(1).unwrap(), BigInt::from(1));
        assert_eq!(cache.double_factorial(3).unwrap(), BigInt::from(3));
        assert_eq!(cache.double_factorial(5).unwrap(), BigInt::from(15));
        assert_eq!(cache.double_factorial(7).unwrap(), BigInt::from(105));
        assert_eq!(cache.double_factorial(19).unwrap(), BigInt::from(654_729_075i64));
    }

    #[test]
    fn sequence_is_decreasing_toward_lower_arguments() {
        let mut cache = CoeffCache::new();
        let seq: Vec<BigInt> = [7i64, 5, 3]
            .iter()
            .map(|&m| cache.double_factorial(m).unwrap())
            .collect();
        assert!(seq[0] > seq[1] && seq[1] > seq[2]);
    }

    #[test]
    fn rejects_even_and_too_negative() {
        let mut cache = CoeffCache::new();
        assert!(matches!(
            cache.double_factorial(4),
            Err(TensorError::DoubleFactorialDomain(4))
        ));
        assert!(matches!(
            cache.double_factorial(-3),
            Err(TensorError::DoubleFactorialDomain(-3))
        ));
    }

    #[test]
    fn memo_fills_on_demand() {
        let mut cache = CoeffCache::new();
        assert_eq!(cache.cached_len(), 0);
        cache.double_factorial(9).unwrap();
        // 9, 7, 5, 3 are cached; 1 and -1 are base cases.
        assert_eq!(cache.cached_len(), 4);
    }

    #[test]
    fn signs_alternate() {
        assert_eq!(signed_coefficient(0), 1);
        assert_eq!(signed_coefficient(1), -1);
        assert_eq!(signed_coefficient(2), 1);
        assert_eq!(signed_coefficient(7), -1);
    }

    #[test]
    fn factorials() {
        assert_eq!(factorial(0), BigInt::from(1));
        assert_eq!(factorial(1), BigInt::from(1));
        assert_eq!(factorial(5), BigInt::from(120));
    }
}
