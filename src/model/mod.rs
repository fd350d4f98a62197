//! Classification models
//!
//! The trainer is polymorphic over two capabilities: every classifier
//! produces a label, and some additionally produce a probability
//! distribution over labels. The second capability is optional and checked
//! through `Classifier::supports_proba` rather than downcasting.

mod decision_tree;
mod metrics;
mod random_forest;

pub use decision_tree::DecisionTreeClassifier;
pub use metrics::{accuracy, classification_report, ClassMetrics, ClassificationReport};
pub use random_forest::RandomForestClassifier;

use crate::error::{RecommenderError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Interface all classifiers implement.
///
/// Labels are dense class indices `0..k-1` as `f64`; the trainer owns the
/// mapping between indices and class names.
pub trait Classifier {
    /// Fit on a feature matrix and class-index labels.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict one class index per row.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Whether this classifier exposes probability estimation.
    fn supports_proba(&self) -> bool {
        false
    }

    /// Per-class probabilities, one row per input row, columns in class
    /// index order. Only valid when `supports_proba` returns true.
    fn predict_proba(&self, _x: &Array2<f64>) -> Result<Array2<f64>> {
        Err(RecommenderError::Data(
            "classifier does not expose probability estimation".to_string(),
        ))
    }
}

/// Model selection for the trainer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelType {
    RandomForest,
    DecisionTree,
}

impl ModelType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "random_forest" => Some(Self::RandomForest),
            "decision_tree" => Some(Self::DecisionTree),
            _ => None,
        }
    }
}

/// Serializable holder for the trained model variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassifierModel {
    RandomForest(RandomForestClassifier),
    DecisionTree(DecisionTreeClassifier),
}

impl Classifier for ClassifierModel {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            Self::RandomForest(m) => m.fit(x, y),
            Self::DecisionTree(m) => m.fit(x, y),
        }
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            Self::RandomForest(m) => m.predict(x),
            Self::DecisionTree(m) => m.predict(x),
        }
    }

    fn supports_proba(&self) -> bool {
        match self {
            Self::RandomForest(m) => m.supports_proba(),
            Self::DecisionTree(m) => m.supports_proba(),
        }
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        match self {
            Self::RandomForest(m) => m.predict_proba(x),
            Self::DecisionTree(m) => m.predict_proba(x),
        }
    }
}
