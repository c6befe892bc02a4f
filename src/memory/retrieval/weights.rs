//! Fusion weights for the lexical and semantic signals.

use serde::{Deserialize, Serialize};

use crate::memory::core::errors::{MemoryError, MemoryResult};

/// Relative weight of each ranking signal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankingWeights {
    /// Weight of the normalized BM25 score.
    pub lexical: f64,
    /// Weight of the cosine similarity.
    pub semantic: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self::new(0.7, 0.3)
    }
}

impl RankingWeights {
    /// Create a weight pair. Values are checked by [`Self::validate`].
    #[must_use]
    pub const fn new(lexical: f64, semantic: f64) -> Self {
        Self { lexical, semantic }
    }

    /// Reject negative, non-finite or all-zero weights.
    ///
    /// # Errors
    /// Returns [`MemoryError::InvalidWeights`].
    pub fn validate(&self) -> MemoryResult<()> {
        for (name, value) in [("lexical", self.lexical), ("semantic", self.semantic)] {
            if !value.is_finite() {
                return Err(MemoryError::InvalidWeights(format!(
                    "{name} weight must be finite, got {value}"
                )));
            }
            if value < 0.0 {
                return Err(MemoryError::InvalidWeights(format!(
                    "{name} weight must be >= 0, got {value}"
                )));
            }
        }
        if self.lexical + self.semantic <= 0.0 {
            return Err(MemoryError::InvalidWeights(
                "weights must not both be zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Scale the pair so it sums to 1.
    ///
    /// # Errors
    /// Returns [`MemoryError::InvalidWeights`] when [`Self::validate`] fails.
    pub fn normalized(&self) -> MemoryResult<Self> {
        self.validate()?;
        let total = self.lexical + self.semantic;
        if (total - 1.0).abs() <= 1e-12 {
            return Ok(*self);
        }
        Ok(Self::new(self.lexical / total, self.semantic / total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_sums_to_one() {
        let w = RankingWeights::new(2.0, 6.0).normalized().unwrap();
        assert!((w.lexical - 0.25).abs() < 1e-12);
        assert!((w.semantic - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for (l, s) in [(0.7, 0.3), (1.0, 0.0), (3.0, 7.0), (0.1, 0.2)] {
            let once = RankingWeights::new(l, s).normalized().unwrap();
            let twice = once.normalized().unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_zero_sum_rejected() {
        let err = RankingWeights::new(0.0, 0.0).normalized().unwrap_err();
        assert!(matches!(err, MemoryError::InvalidWeights(_)));
    }

    #[test]
    fn test_negative_and_nan_rejected() {
        assert!(RankingWeights::new(-0.1, 1.0).validate().is_err());
        assert!(RankingWeights::new(f64::NAN, 1.0).validate().is_err());
        assert!(RankingWeights::new(1.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_one_sided_weights_allowed() {
        let w = RankingWeights::new(0.0, 5.0).normalized().unwrap();
        assert!((w.semantic - 1.0).abs() < f64::EPSILON);
        assert!(w.lexical.abs() < f64::EPSILON);
    }
}
