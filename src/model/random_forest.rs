//! Random forest classifier built on bootstrapped decision trees

use super::{Classifier, DecisionTreeClassifier};
use crate::error::{RecommenderError, Result};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random forest classifier.
///
/// Trees are fitted in parallel on bootstrap samples with sqrt-sized
/// feature subsets per split. Predictions are majority votes; class
/// probabilities are the fraction of trees voting for each class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    trees: Vec<DecisionTreeClassifier>,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub random_state: u64,
    n_classes: usize,
    is_fitted: bool,
}

impl RandomForestClassifier {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            random_state: 42,
            n_classes: 0,
            is_fitted: false,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Per-row vote counts across the ensemble.
    fn vote_counts(&self, x: &Array2<f64>) -> Result<Vec<Vec<usize>>> {
        if !self.is_fitted {
            return Err(RecommenderError::ModelNotFitted);
        }

        let per_tree: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>>>()?;

        let mut counts = vec![vec![0usize; self.n_classes]; x.nrows()];
        for preds in &per_tree {
            for (row, &label) in preds.iter().enumerate() {
                counts[row][label as usize] += 1;
            }
        }
        Ok(counts)
    }
}

impl Classifier for RandomForestClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() == 0 {
            return Err(RecommenderError::Training(
                "cannot fit a forest on an empty matrix".to_string(),
            ));
        }
        if self.n_estimators == 0 {
            return Err(RecommenderError::Training(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        let n_rows = x.nrows();
        let n_features = x.ncols();
        self.n_classes = y.iter().map(|&v| v as usize).max().unwrap_or(0) + 1;

        let max_features = (n_features as f64).sqrt().ceil().max(1.0) as usize;

        // Draw per-tree seeds from the master generator so the whole
        // ensemble is reproducible from a single seed.
        let mut master = ChaCha8Rng::seed_from_u64(self.random_state);
        let tree_seeds: Vec<u64> = (0..self.n_estimators).map(|_| master.gen()).collect();
        let max_depth = self.max_depth;

        self.trees = tree_seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let sample: Vec<usize> =
                    (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();

                let x_boot = Array2::from_shape_fn((n_rows, n_features), |(r, c)| {
                    x[[sample[r], c]]
                });
                let y_boot = Array1::from_shape_fn(n_rows, |r| y[sample[r]]);

                let mut tree = DecisionTreeClassifier::new()
                    .with_max_features(max_features)
                    .with_random_state(seed);
                if let Some(depth) = max_depth {
                    tree = tree.with_max_depth(depth);
                }
                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        self.is_fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let counts = self.vote_counts(x)?;
        let labels = counts
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .max_by_key(|(_, &c)| c)
                    .map(|(class, _)| class as f64)
                    .unwrap_or(0.0)
            })
            .collect();
        Ok(Array1::from_vec(labels))
    }

    fn supports_proba(&self) -> bool {
        true
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let counts = self.vote_counts(x)?;
        let n_trees = self.trees.len() as f64;
        Ok(Array2::from_shape_fn(
            (x.nrows(), self.n_classes),
            |(r, c)| counts[r][c] as f64 / n_trees,
        ))
    }
}
