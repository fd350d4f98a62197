//! Single-request prediction over a loaded bundle
//!
//! The recommender rebuilds a one-row frame in the frozen feature order
//! so serving applies exactly the transformations fitted at training
//! time.

use crate::artifact::ModelBundle;
use crate::error::{RecommenderError, Result};
use crate::model::Classifier;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Response payload for one recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub recommended_incentive_program: String,
    /// Present only when the underlying model exposes probabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_probabilities: Option<BTreeMap<String, f64>>,
}

pub struct Recommender {
    bundle: ModelBundle,
}

impl Recommender {
    pub fn new(bundle: ModelBundle) -> Self {
        Self { bundle }
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.bundle.feature_columns
    }

    /// Validate the request features and predict one program label.
    pub fn recommend(&self, features: &serde_json::Map<String, Value>) -> Result<Recommendation> {
        let missing: Vec<String> = self
            .bundle
            .feature_columns
            .iter()
            .filter(|name| !features.contains_key(name.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(RecommenderError::Validation { missing });
        }

        let df = self.build_row(features)?;
        let x = self.bundle.pipeline.transform(&df)?;
        let pred = self.bundle.model.predict(&x)?;
        let class_idx = pred[0] as usize;
        let label = self
            .bundle
            .classes
            .get(class_idx)
            .ok_or_else(|| {
                RecommenderError::Data(format!("predicted class index {class_idx} out of range"))
            })?
            .clone();

        let class_probabilities = if self.bundle.model.supports_proba() {
            let proba = self.bundle.model.predict_proba(&x)?;
            Some(
                self.bundle
                    .classes
                    .iter()
                    .enumerate()
                    .map(|(i, name)| (name.clone(), proba[[0, i]]))
                    .collect(),
            )
        } else {
            None
        };

        Ok(Recommendation {
            recommended_incentive_program: label,
            class_probabilities,
        })
    }

    /// One-row frame in frozen feature order, typed per the fitted
    /// pipeline's numeric/categorical assignment.
    fn build_row(&self, features: &serde_json::Map<String, Value>) -> Result<DataFrame> {
        let numeric: std::collections::HashSet<&str> = self
            .bundle
            .pipeline
            .numeric_columns()
            .iter()
            .map(|s| s.as_str())
            .collect();

        let mut columns: Vec<Column> = Vec::with_capacity(self.bundle.feature_columns.len());
        for name in &self.bundle.feature_columns {
            let value = &features[name.as_str()];
            let series = if numeric.contains(name.as_str()) {
                Series::new(name.as_str().into(), vec![numeric_value(name, value)?])
            } else {
                Series::new(name.as_str().into(), vec![string_value(name, value)?])
            };
            columns.push(series.into());
        }
        Ok(DataFrame::new(columns)?)
    }
}

fn numeric_value(name: &str, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| {
            RecommenderError::Data(format!("feature '{name}' is not a finite number"))
        }),
        Value::String(s) => s.parse::<f64>().map_err(|_| {
            RecommenderError::Data(format!("feature '{name}' expects a numeric value"))
        }),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        _ => Err(RecommenderError::Data(format!(
            "feature '{name}' expects a numeric value"
        ))),
    }
}

fn string_value(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("unknown".to_string()),
        _ => Err(RecommenderError::Data(format!(
            "feature '{name}' expects a scalar value"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClassifierModel;
    use crate::model::RandomForestClassifier;
    use crate::pipeline::GlobalIncentiveStats;
    use crate::preprocessing::FeaturePipeline;
    use ndarray::array;
    use serde_json::json;

    fn fitted_recommender() -> Recommender {
        let df = df! {
            "amount" => &[1.0, 2.0, 3.0, 20.0, 21.0, 22.0],
            "region" => &["north", "north", "north", "south", "south", "south"],
        }
        .unwrap();

        let mut pipeline =
            FeaturePipeline::new(vec!["amount".to_string(), "region".to_string()]);
        let x = pipeline.fit_transform(&df).unwrap();
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut forest = RandomForestClassifier::new(15);
        forest.fit(&x, &y).unwrap();

        Recommender::new(ModelBundle {
            pipeline,
            model: ClassifierModel::RandomForest(forest),
            feature_columns: vec!["amount".to_string(), "region".to_string()],
            target_column: "ideal_incentive_program".to_string(),
            classes: vec!["cashback".to_string(), "points".to_string()],
            global_stats: GlobalIncentiveStats {
                avg_incentive_amount: 10.0,
                max_incentive_amount: 22.0,
                min_incentive_amount: 1.0,
                available_program_count: 2,
            },
        })
    }

    #[test]
    fn test_feature_columns_expose_frozen_order() {
        let recommender = fitted_recommender();
        assert_eq!(
            recommender.feature_columns(),
            &["amount".to_string(), "region".to_string()]
        );
    }

    #[test]
    fn test_recommend_known_region() {
        let recommender = fitted_recommender();
        let request = json!({"amount": 2.0, "region": "north"});

        let rec = recommender
            .recommend(request.as_object().unwrap())
            .unwrap();

        assert_eq!(rec.recommended_incentive_program, "cashback");
        let proba = rec.class_probabilities.unwrap();
        let sum: f64 = proba.values().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_features_listed() {
        let recommender = fitted_recommender();
        let request = json!({"amount": 2.0});

        let err = recommender
            .recommend(request.as_object().unwrap())
            .unwrap_err();
        match err {
            RecommenderError::Validation { missing } => {
                assert_eq!(missing, vec!["region".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_numeric_string_accepted() {
        let recommender = fitted_recommender();
        let request = json!({"amount": "21.0", "region": "south"});

        let rec = recommender
            .recommend(request.as_object().unwrap())
            .unwrap();
        assert_eq!(rec.recommended_incentive_program, "points");
    }

    #[test]
    fn test_unknown_category_still_predicts() {
        let recommender = fitted_recommender();
        let request = json!({"amount": 2.0, "region": "east"});

        // Unknown categories encode to all zeros rather than failing.
        let rec = recommender
            .recommend(request.as_object().unwrap())
            .unwrap();
        assert!(["cashback", "points"]
            .contains(&rec.recommended_incentive_program.as_str()));
    }
}
