//! CART decision tree classifier (gini impurity)

use super::Classifier;
use crate::error::{RecommenderError, Result};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        class: f64,
        n_samples: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

/// Decision tree classifier.
///
/// A single tree predicts hard labels only; it does not report the
/// probability capability. Probability estimation comes from the forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    root: Option<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features considered per split; all features when None.
    pub max_features: Option<usize>,
    pub random_state: Option<u64>,
    n_features: usize,
    n_classes: usize,
}

impl DecisionTreeClassifier {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
            random_state: None,
            n_features: 0,
            n_classes: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    fn build(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let counts = class_counts(y, indices, self.n_classes);
        let majority = majority_class(&counts);
        let n_samples = indices.len();

        let at_depth_limit = self.max_depth.is_some_and(|d| depth >= d);
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        if at_depth_limit || pure || n_samples < self.min_samples_split {
            return TreeNode::Leaf {
                class: majority,
                n_samples,
            };
        }

        let candidate_features = self.sample_features(rng);
        let Some((feature_idx, threshold)) =
            best_split(x, y, indices, &candidate_features, &counts, self.n_classes)
        else {
            return TreeNode::Leaf {
                class: majority,
                n_samples,
            };
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| x[[i, feature_idx]] <= threshold);

        if left_idx.is_empty() || right_idx.is_empty() {
            return TreeNode::Leaf {
                class: majority,
                n_samples,
            };
        }

        TreeNode::Split {
            feature_idx,
            threshold,
            left: Box::new(self.build(x, y, &left_idx, depth + 1, rng)),
            right: Box::new(self.build(x, y, &right_idx, depth + 1, rng)),
            n_samples,
        }
    }

    fn sample_features(&self, rng: &mut ChaCha8Rng) -> Vec<usize> {
        match self.max_features {
            Some(k) if k < self.n_features => {
                let mut all: Vec<usize> = (0..self.n_features).collect();
                all.shuffle(rng);
                all.truncate(k);
                all.sort_unstable();
                all
            }
            _ => (0..self.n_features).collect(),
        }
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        let mut node = self.root.as_ref().ok_or(RecommenderError::ModelNotFitted)?;
        loop {
            match node {
                TreeNode::Leaf { class, .. } => return Ok(*class),
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if row[*feature_idx] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

impl Classifier for DecisionTreeClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() == 0 {
            return Err(RecommenderError::Training(
                "cannot fit a tree on an empty matrix".to_string(),
            ));
        }
        if x.nrows() != y.len() {
            return Err(RecommenderError::Data(format!(
                "feature matrix has {} rows but target has {}",
                x.nrows(),
                y.len()
            )));
        }

        self.n_features = x.ncols();
        self.n_classes = y.iter().map(|&v| v as usize).max().unwrap_or(0) + 1;

        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state.unwrap_or(0));
        let indices: Vec<usize> = (0..x.nrows()).collect();
        self.root = Some(self.build(x, y, &indices, 0, &mut rng));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let mut out = Vec::with_capacity(x.nrows());
        for row in x.rows() {
            out.push(self.predict_row(row.as_slice().ok_or_else(|| {
                RecommenderError::Data("non-contiguous feature row".to_string())
            })?)?);
        }
        Ok(Array1::from_vec(out))
    }
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn class_counts(y: &Array1<f64>, indices: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &i in indices {
        counts[y[i] as usize] += 1;
    }
    counts
}

fn majority_class(counts: &[usize]) -> f64 {
    counts
        .iter()
        .enumerate()
        .max_by_key(|(_, &c)| c)
        .map(|(class, _)| class as f64)
        .unwrap_or(0.0)
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let sum_sq: f64 = counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total as f64;
            p * p
        })
        .sum();
    1.0 - sum_sq
}

/// Exhaustive split search over the candidate features.
///
/// Sorts each feature once and sweeps class counts across the boundary,
/// scoring weighted gini at every distinct-value breakpoint.
fn best_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    indices: &[usize],
    features: &[usize],
    parent_counts: &[usize],
    n_classes: usize,
) -> Option<(usize, f64)> {
    let n = indices.len();
    let parent_gini = gini(parent_counts, n);
    let mut best: Option<(usize, f64, f64)> = None; // (feature, threshold, gain)

    for &feature_idx in features {
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| {
            x[[a, feature_idx]]
                .partial_cmp(&x[[b, feature_idx]])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left_counts = vec![0usize; n_classes];
        let mut right_counts = parent_counts.to_vec();

        for split_at in 1..n {
            let moved = order[split_at - 1];
            left_counts[y[moved] as usize] += 1;
            right_counts[y[moved] as usize] -= 1;

            let prev = x[[order[split_at - 1], feature_idx]];
            let next = x[[order[split_at], feature_idx]];
            if prev == next {
                continue;
            }

            let weighted = (split_at as f64 * gini(&left_counts, split_at)
                + (n - split_at) as f64 * gini(&right_counts, n - split_at))
                / n as f64;
            let gain = parent_gini - weighted;

            if gain > 1e-12 && best.map_or(true, |(_, _, g)| gain > g) {
                best = Some((feature_idx, (prev + next) / 2.0, gain));
            }
        }
    }

    best.map(|(feature_idx, threshold, _)| (feature_idx, threshold))
}
