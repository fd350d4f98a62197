//! Stratified train/test split and model fitting

use crate::artifact::ModelBundle;
use crate::error::{RecommenderError, Result};
use crate::model::{
    accuracy, classification_report, Classifier, ClassifierModel, ClassificationReport,
    DecisionTreeClassifier, ModelType, RandomForestClassifier,
};
use crate::pipeline::TrainingDataset;
use crate::preprocessing::FeaturePipeline;
use ndarray::Array1;
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Trainer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Fraction of rows held out for evaluation.
    pub test_size: f64,
    pub seed: u64,
    pub model_type: ModelType,
    pub n_estimators: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
            model_type: ModelType::RandomForest,
            n_estimators: 300,
        }
    }
}

/// Evaluation summary produced alongside the bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub accuracy: f64,
    pub classification_report: ClassificationReport,
    pub train_rows: usize,
    pub test_rows: usize,
}

pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Fit the feature pipeline and model on the training partition and
    /// evaluate on the held-out partition.
    pub fn train(&self, dataset: &TrainingDataset) -> Result<(ModelBundle, MetricsReport)> {
        let df = &dataset.training_df;
        if df.height() == 0 {
            return Err(RecommenderError::Training(
                "training table is empty".to_string(),
            ));
        }

        let labels = target_labels(df, &dataset.target_column)?;
        let classes = distinct_classes(&labels);
        if classes.len() < 2 {
            return Err(RecommenderError::Training(format!(
                "need at least 2 target classes, found {}",
                classes.len()
            )));
        }

        let class_index: BTreeMap<&str, usize> = classes
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        let y_all: Vec<f64> = labels
            .iter()
            .map(|label| class_index[label.as_str()] as f64)
            .collect();

        let (train_idx, test_idx) = self.stratified_split(&y_all, classes.len());
        info!(
            train_rows = train_idx.len(),
            test_rows = test_idx.len(),
            n_classes = classes.len(),
            "training split prepared"
        );

        let features_df = df.select(dataset.feature_columns.iter().cloned())?;
        let train_df = take_rows(&features_df, &train_idx)?;
        let test_df = take_rows(&features_df, &test_idx)?;
        let y_train = Array1::from_iter(train_idx.iter().map(|&i| y_all[i]));
        let y_test = Array1::from_iter(test_idx.iter().map(|&i| y_all[i]));

        let mut pipeline = FeaturePipeline::new(dataset.feature_columns.clone());
        let x_train = pipeline.fit_transform(&train_df)?;

        let mut model = self.build_model();
        model.fit(&x_train, &y_train)?;

        let (acc, report) = if test_idx.is_empty() {
            let empty = Array1::from_vec(Vec::new());
            (0.0, classification_report(&empty, &empty, &classes))
        } else {
            let x_test = pipeline.transform(&test_df)?;
            let y_pred = model.predict(&x_test)?;
            (
                accuracy(&y_test, &y_pred),
                classification_report(&y_test, &y_pred, &classes),
            )
        };
        info!(accuracy = acc, "model evaluation complete");

        let metrics = MetricsReport {
            accuracy: acc,
            classification_report: report,
            train_rows: train_idx.len(),
            test_rows: test_idx.len(),
        };
        let bundle = ModelBundle {
            pipeline,
            model,
            feature_columns: dataset.feature_columns.clone(),
            target_column: dataset.target_column.clone(),
            classes,
            global_stats: dataset.global_stats.clone(),
        };
        Ok((bundle, metrics))
    }

    fn build_model(&self) -> ClassifierModel {
        match self.config.model_type {
            ModelType::RandomForest => ClassifierModel::RandomForest(
                RandomForestClassifier::new(self.config.n_estimators)
                    .with_random_state(self.config.seed),
            ),
            ModelType::DecisionTree => ClassifierModel::DecisionTree(
                DecisionTreeClassifier::new().with_random_state(self.config.seed),
            ),
        }
    }

    /// Seeded per-class split.
    ///
    /// Each class keeps at least one row in the training partition;
    /// classes with a single member contribute nothing to the test set.
    fn stratified_split(&self, y: &[f64], n_classes: usize) -> (Vec<usize>, Vec<usize>) {
        let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
        for (i, &label) in y.iter().enumerate() {
            by_class[label as usize].push(i);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let mut train_idx = Vec::new();
        let mut test_idx = Vec::new();

        for mut members in by_class {
            members.shuffle(&mut rng);
            let n = members.len();
            let n_test = ((n as f64 * self.config.test_size).round() as usize).min(n - 1);
            test_idx.extend_from_slice(&members[..n_test]);
            train_idx.extend_from_slice(&members[n_test..]);
        }

        train_idx.sort_unstable();
        test_idx.sort_unstable();
        (train_idx, test_idx)
    }
}

fn target_labels(df: &DataFrame, target_column: &str) -> Result<Vec<String>> {
    let column = df
        .column(target_column)
        .map_err(|_| RecommenderError::FeatureNotFound(target_column.to_string()))?;
    let strings = column.as_materialized_series().cast(&DataType::String)?;
    let ca = strings.str()?;
    let mut labels = Vec::with_capacity(df.height());
    for value in ca.into_iter() {
        match value {
            Some(v) => labels.push(v.to_string()),
            None => {
                return Err(RecommenderError::Training(
                    "target column contains missing values".to_string(),
                ))
            }
        }
    }
    Ok(labels)
}

fn distinct_classes(labels: &[String]) -> Vec<String> {
    let mut classes: Vec<String> = labels.to_vec();
    classes.sort();
    classes.dedup();
    classes
}

fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx: IdxCa = indices.iter().map(|&i| Some(i as IdxSize)).collect();
    Ok(df.take(&idx)?)
}
