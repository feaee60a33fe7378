// Pearson product-moment correlation with a two-sided p-value.
//
// The p-value tests H0: no linear correlation, using t = r * sqrt(df / (1 - r^2))
// with df = n - 2. Under that t, P(|T| >= |t|) reduces to I_{1-r^2}(df/2, 1/2).
// This assumes roughly bivariate-normal data; for other score distributions
// treat the p-value as approximate.

use serde::{Deserialize, Serialize};

use super::beta::regularized_incomplete_beta;
use crate::error::SimilarityError;

/// Correlation summary for one dataset.
///
/// Serializes to `{ "statistic": f64, "pvalue": f64 }`, the same shape as
/// entries in the stored result table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Pearson r in [-1, 1]
    pub statistic: f64,
    /// Two-sided p-value in (0, 1]
    pub pvalue: f64,
}

/// Correlate computed scores against reference scores, pairwise by position.
///
/// Both slices must have the same length n >= 2, contain only finite values,
/// and each must vary. Reordering both slices with the same permutation
/// leaves the result unchanged.
pub fn pearson(computed: &[f64], reference: &[f64]) -> Result<CorrelationResult, SimilarityError> {
    if computed.len() != reference.len() {
        return Err(SimilarityError::ShapeMismatch {
            computed: computed.len(),
            reference: reference.len(),
        });
    }

    let n = computed.len();
    if n < 2 {
        return Err(SimilarityError::InsufficientData { n });
    }

    if let Some(index) = computed
        .iter()
        .zip(reference)
        .position(|(x, y)| !x.is_finite() || !y.is_finite())
    {
        return Err(SimilarityError::NonFinite { index });
    }

    let (Some(dx), Some(dy)) = (unit_deviations(computed), unit_deviations(reference)) else {
        return Err(SimilarityError::ZeroVariance);
    };

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (x, y) in dx.iter().zip(&dy) {
        sxx += x * x;
        syy += y * y;
        sxy += x * y;
    }

    // Rounding can push |r| a hair past 1.
    let statistic = (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0);

    let pvalue = if n == 2 {
        // Two points always lie on a line.
        1.0
    } else {
        let df = (n - 2) as f64;
        let x = 1.0 - statistic * statistic;
        regularized_incomplete_beta(x, df / 2.0, 0.5)
    };

    Ok(CorrelationResult {
        statistic,
        pvalue: pvalue.clamp(f64::MIN_POSITIVE, 1.0),
    })
}

/// Deviations from the mean, scaled so the largest has magnitude 1.
///
/// Values are scaled by their max-abs before centering and again after, so
/// squares neither overflow for huge scores nor underflow for tiny ones.
/// `None` when the sequence is constant. r is invariant to both scalings.
fn unit_deviations(values: &[f64]) -> Option<Vec<f64>> {
    let scale = max_abs(values.iter().copied());
    if scale == 0.0 {
        return None;
    }

    let scaled: Vec<f64> = values.iter().map(|v| v / scale).collect();
    let mean = scaled.iter().sum::<f64>() / scaled.len() as f64;
    let deviations: Vec<f64> = scaled.iter().map(|v| v - mean).collect();

    let spread = max_abs(deviations.iter().copied());
    if spread == 0.0 {
        return None;
    }
    Some(deviations.into_iter().map(|d| d / spread).collect())
}

fn max_abs(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, |acc, v| acc.max(v.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_linear_relationship() {
        let result = pearson(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]).unwrap();
        assert!((result.statistic - 1.0).abs() < 1e-9);
        assert!(result.pvalue > 0.0 && result.pvalue < 1e-9, "p = {}", result.pvalue);
    }

    #[test]
    fn test_perfect_negative_relationship() {
        let result = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[5.0, 4.0, 3.0, 2.0, 1.0]).unwrap();
        assert!((result.statistic + 1.0).abs() < 1e-9);
        assert!(result.pvalue < 1e-9);
    }

    #[test]
    fn test_known_moderate_correlation() {
        // r = 0.8, p = 0.1041 for this textbook example
        let result = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 1.0, 4.0, 3.0, 5.0]).unwrap();
        assert!((result.statistic - 0.8).abs() < 1e-12);
        assert!((result.pvalue - 0.104_088_038_661_8).abs() < 1e-9, "p = {}", result.pvalue);
    }

    #[test]
    fn test_two_points_have_p_of_one() {
        let result = pearson(&[0.1, 0.9], &[3.0, 1.0]).unwrap();
        assert!((result.statistic + 1.0).abs() < 1e-12);
        assert_eq!(result.pvalue, 1.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = pearson(&[1.0, 2.0, 3.0], &[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            SimilarityError::ShapeMismatch {
                computed: 3,
                reference: 2
            }
        );
    }

    #[test]
    fn test_insufficient_data() {
        assert_eq!(
            pearson(&[0.5], &[1.0]).unwrap_err(),
            SimilarityError::InsufficientData { n: 1 }
        );
        assert_eq!(
            pearson(&[], &[]).unwrap_err(),
            SimilarityError::InsufficientData { n: 0 }
        );
    }

    #[test]
    fn test_huge_reference_scale() {
        let result = pearson(&[0.1, 0.2, 0.3], &[1e160, 2e160, 3e160]).unwrap();
        assert!((result.statistic - 1.0).abs() < 1e-12, "r = {}", result.statistic);
        assert!(result.pvalue < 1e-3, "p = {}", result.pvalue);
    }

    #[test]
    fn test_tiny_reference_scale() {
        let result = pearson(&[0.1, 0.2, 0.3], &[1e-170, 2e-170, 3e-170]).unwrap();
        assert!((result.statistic - 1.0).abs() < 1e-12, "r = {}", result.statistic);
    }

    #[test]
    fn test_scale_does_not_change_r() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 1.0, 4.0, 3.0, 5.0];
        let base = pearson(&xs, &ys).unwrap();
        let huge: Vec<f64> = ys.iter().map(|y| y * 1e300).collect();
        let tiny: Vec<f64> = xs.iter().map(|x| x * 1e-300).collect();
        let scaled = pearson(&tiny, &huge).unwrap();
        assert!((base.statistic - scaled.statistic).abs() < 1e-12);
        assert!((base.pvalue - scaled.pvalue).abs() < 1e-9);
    }

    #[test]
    fn test_constant_sequence() {
        let err = pearson(&[0.5, 0.5, 0.5], &[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err, SimilarityError::ZeroVariance);
    }

    #[test]
    fn test_non_finite_value() {
        let err = pearson(&[0.1, 0.2, 0.3], &[1.0, f64::NAN, 3.0]).unwrap_err();
        assert_eq!(err, SimilarityError::NonFinite { index: 1 });
    }

    #[test]
    fn test_serializes_to_stored_shape() {
        let result = CorrelationResult {
            statistic: 0.25,
            pvalue: 0.5,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"statistic":0.25,"pvalue":0.5}"#);
    }
}
