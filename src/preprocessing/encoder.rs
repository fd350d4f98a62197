//! One-hot encoding for categorical feature columns

use crate::error::{RecommenderError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One-hot encoder with a sorted category vocabulary per column.
///
/// Categories unseen at fit time encode as an all-zero block, matching the
/// "ignore unknown" behavior the serving path needs for novel inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: HashMap<String, Vec<String>>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self {
            categories: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Collect the sorted distinct values of each categorical column.
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| RecommenderError::FeatureNotFound(col_name.clone()))?;
            let series = column.as_materialized_series().cast(&DataType::String)?;
            let ca = series.str()?;

            let mut values: Vec<String> = ca
                .into_iter()
                .flatten()
                .map(|v| v.to_string())
                .collect();
            values.sort();
            values.dedup();

            self.categories.insert(col_name.clone(), values);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Expand a single column into its indicator block, one `Vec<f64>` per
    /// known category, in vocabulary order.
    pub fn transform_column(&self, series: &Series) -> Result<Vec<Vec<f64>>> {
        if !self.is_fitted {
            return Err(RecommenderError::ModelNotFitted);
        }
        let vocabulary = self
            .categories
            .get(series.name().as_str())
            .ok_or_else(|| RecommenderError::FeatureNotFound(series.name().to_string()))?;

        let cast = series.cast(&DataType::String)?;
        let ca = cast.str()?;
        let values: Vec<Option<&str>> = ca.into_iter().collect();

        Ok(vocabulary
            .iter()
            .map(|category| {
                values
                    .iter()
                    .map(|v| match v {
                        Some(v) if *v == category.as_str() => 1.0,
                        _ => 0.0,
                    })
                    .collect()
            })
            .collect())
    }

    /// Output column names for one input column, `{col}_{category}`.
    pub fn output_names(&self, col_name: &str) -> Result<Vec<String>> {
        let vocabulary = self
            .categories
            .get(col_name)
            .ok_or_else(|| RecommenderError::FeatureNotFound(col_name.to_string()))?;
        Ok(vocabulary
            .iter()
            .map(|category| format!("{col_name}_{category}"))
            .collect())
    }
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_is_sorted() {
        let df = df!("city" => &["NYC", "LA", "NYC", "SF"]).unwrap();
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&df, &["city".to_string()]).unwrap();

        assert_eq!(
            encoder.output_names("city").unwrap(),
            vec!["city_LA", "city_NYC", "city_SF"]
        );
    }

    #[test]
    fn test_indicator_block() {
        let df = df!("city" => &["NYC", "LA"]).unwrap();
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&df, &["city".to_string()]).unwrap();

        let block = encoder
            .transform_column(df.column("city").unwrap().as_materialized_series())
            .unwrap();
        // Columns in vocabulary order: LA, NYC.
        assert_eq!(block[0], vec![0.0, 1.0]);
        assert_eq!(block[1], vec![1.0, 0.0]);
    }

    #[test]
    fn test_unknown_category_encodes_as_zeros() {
        let train = df!("city" => &["NYC", "LA"]).unwrap();
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&train, &["city".to_string()]).unwrap();

        let test = df!("city" => &["Boston"]).unwrap();
        let block = encoder
            .transform_column(test.column("city").unwrap().as_materialized_series())
            .unwrap();
        assert!(block.iter().all(|col| col[0] == 0.0));
    }
}
