//! Classification evaluation metrics

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-class precision, recall, and f1 with the class support count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Classification report over all classes plus macro averages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub per_class: BTreeMap<String, ClassMetrics>,
    pub macro_avg: ClassMetrics,
    pub accuracy: f64,
}

/// Fraction of predictions matching the true labels.
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Per-class precision/recall/f1 report.
///
/// Labels are dense class indices into `classes`, which carries the
/// human-readable names in index order.
pub fn classification_report(
    y_true: &Array1<f64>,
    y_pred: &Array1<f64>,
    classes: &[String],
) -> ClassificationReport {
    let k = classes.len();
    let mut true_positive = vec![0usize; k];
    let mut false_positive = vec![0usize; k];
    let mut false_negative = vec![0usize; k];
    let mut support = vec![0usize; k];

    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        let t = t as usize;
        let p = p as usize;
        support[t] += 1;
        if t == p {
            true_positive[t] += 1;
        } else {
            false_negative[t] += 1;
            false_positive[p] += 1;
        }
    }

    let mut per_class = BTreeMap::new();
    let mut precision_sum = 0.0;
    let mut recall_sum = 0.0;
    let mut f1_sum = 0.0;

    for (idx, name) in classes.iter().enumerate() {
        let predicted = true_positive[idx] + false_positive[idx];
        let precision = if predicted == 0 {
            0.0
        } else {
            true_positive[idx] as f64 / predicted as f64
        };
        let recall = if support[idx] == 0 {
            0.0
        } else {
            true_positive[idx] as f64 / support[idx] as f64
        };
        let f1_score = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        precision_sum += precision;
        recall_sum += recall;
        f1_sum += f1_score;

        per_class.insert(
            name.clone(),
            ClassMetrics {
                precision,
                recall,
                f1_score,
                support: support[idx],
            },
        );
    }

    let denom = k.max(1) as f64;
    ClassificationReport {
        per_class,
        macro_avg: ClassMetrics {
            precision: precision_sum / denom,
            recall: recall_sum / denom,
            f1_score: f1_sum / denom,
            support: y_true.len(),
        },
        accuracy: accuracy(y_true, y_pred),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_accuracy_perfect_and_half() {
        let y = array![0.0, 1.0, 1.0, 0.0];
        assert_eq!(accuracy(&y, &y), 1.0);

        let pred = array![0.0, 1.0, 0.0, 1.0];
        assert_eq!(accuracy(&y, &pred), 0.5);
    }

    #[test]
    fn test_report_per_class_values() {
        let y_true = array![0.0, 0.0, 1.0, 1.0];
        let y_pred = array![0.0, 1.0, 1.0, 1.0];
        let classes = vec!["bronze".to_string(), "gold".to_string()];

        let report = classification_report(&y_true, &y_pred, &classes);

        let bronze = &report.per_class["bronze"];
        assert_eq!(bronze.precision, 1.0);
        assert_eq!(bronze.recall, 0.5);
        assert_eq!(bronze.support, 2);

        let gold = &report.per_class["gold"];
        assert!((gold.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(gold.recall, 1.0);

        assert_eq!(report.accuracy, 0.75);
        assert_eq!(report.macro_avg.support, 4);
    }

    #[test]
    fn test_absent_class_scores_zero() {
        let y_true = array![0.0, 0.0];
        let y_pred = array![0.0, 0.0];
        let classes = vec!["bronze".to_string(), "gold".to_string()];

        let report = classification_report(&y_true, &y_pred, &classes);
        let gold = &report.per_class["gold"];
        assert_eq!(gold.precision, 0.0);
        assert_eq!(gold.recall, 0.0);
        assert_eq!(gold.f1_score, 0.0);
        assert_eq!(gold.support, 0);
    }
}
