// Unit tests for correlation.
//
// Tests pearson error cases (shape, sample size, constant input, non-finite
// values), perfect and inverse correlation, invariance under reordering,
// and the stored result table format.

use lexsim::error::SimilarityError;
use lexsim::results::ResultTable;
use lexsim::stats::{pearson, CorrelationResult};

// ============================================================
// pearson: error cases
// ============================================================

#[test]
fn pearson_rejects_shape_mismatch() {
    let err = pearson(&[0.1, 0.2, 0.3], &[1.0, 2.0]).unwrap_err();
    assert_eq!(
        err,
        SimilarityError::ShapeMismatch {
            computed: 3,
            reference: 2,
        }
    );
}

#[test]
fn pearson_rejects_single_pair() {
    let err = pearson(&[0.5], &[3.0]).unwrap_err();
    assert_eq!(err, SimilarityError::InsufficientData { n: 1 });
}

#[test]
fn pearson_rejects_empty_input() {
    let err = pearson(&[], &[]).unwrap_err();
    assert_eq!(err, SimilarityError::InsufficientData { n: 0 });
}

#[test]
fn pearson_rejects_constant_computed_scores() {
    let err = pearson(&[0.2, 0.2, 0.2], &[1.0, 2.0, 3.0]).unwrap_err();
    assert_eq!(err, SimilarityError::ZeroVariance);
}

#[test]
fn pearson_rejects_constant_reference_scores() {
    let err = pearson(&[0.1, 0.2, 0.3], &[5.0, 5.0, 5.0]).unwrap_err();
    assert_eq!(err, SimilarityError::ZeroVariance);
}

#[test]
fn pearson_rejects_nan() {
    let err = pearson(&[0.1, f64::NAN, 0.3], &[1.0, 2.0, 3.0]).unwrap_err();
    assert_eq!(err, SimilarityError::NonFinite { index: 1 });
}

// ============================================================
// pearson: values
// ============================================================

#[test]
fn pearson_self_correlation_is_one() {
    let xs = [0.1, 0.4, 0.35, 0.8, 0.65, 0.2];
    let result = pearson(&xs, &xs).unwrap();
    assert!((result.statistic - 1.0).abs() < 1e-12);
    assert!(result.pvalue < 1e-6, "p = {}", result.pvalue);
    assert!(result.pvalue > 0.0);
}

#[test]
fn pearson_inverse_correlation_is_minus_one() {
    let result = pearson(&[1.0, 2.0, 3.0, 4.0], &[8.0, 6.0, 4.0, 2.0]).unwrap();
    assert!((result.statistic + 1.0).abs() < 1e-12);
}

#[test]
fn pearson_two_pairs_has_pvalue_one() {
    let result = pearson(&[0.1, 0.9], &[2.0, 7.0]).unwrap();
    assert!((result.statistic - 1.0).abs() < 1e-12);
    assert_eq!(result.pvalue, 1.0);
}

#[test]
fn pearson_invariant_under_joint_reordering() {
    let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
    let ys = [2.0, 1.0, 4.0, 3.0, 5.0];
    let forward = pearson(&xs, &ys).unwrap();

    let xs_rev: Vec<f64> = xs.iter().rev().copied().collect();
    let ys_rev: Vec<f64> = ys.iter().rev().copied().collect();
    let reversed = pearson(&xs_rev, &ys_rev).unwrap();

    assert!((forward.statistic - reversed.statistic).abs() < 1e-12);
    assert!((forward.pvalue - reversed.pvalue).abs() < 1e-12);
}

#[test]
fn pearson_weak_correlation_is_not_significant() {
    let result = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 1.0, 4.0, 3.0, 5.0]).unwrap();
    assert!((result.statistic - 0.8).abs() < 1e-12);
    assert!(result.pvalue > 0.05 && result.pvalue < 0.2, "p = {}", result.pvalue);
}

// ============================================================
// ResultTable: stored format
// ============================================================

#[test]
fn result_table_entry_shape() {
    let mut table = ResultTable::new();
    table.insert(
        "toy",
        CorrelationResult {
            statistic: 0.5,
            pvalue: 0.25,
        },
    );
    let json: serde_json::Value = serde_json::from_str(&table.to_json().unwrap()).unwrap();
    assert_eq!(json["toy"]["statistic"], 0.5);
    assert_eq!(json["toy"]["pvalue"], 0.25);
}

#[test]
fn result_table_keeps_file_order() {
    let raw = r#"{
        "zeta": { "statistic": 0.1, "pvalue": 0.9 },
        "alpha": { "statistic": 0.7, "pvalue": 0.01 }
    }"#;
    let table = ResultTable::from_json(raw).unwrap();
    let names: Vec<&str> = table.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
}

#[test]
fn result_table_rejects_missing_field() {
    let raw = r#"{ "toy": { "statistic": 0.1 } }"#;
    assert!(ResultTable::from_json(raw).is_err());
}
