//! Fitted preprocessing pipeline: column typing, scaling, encoding

use super::{OneHotEncoder, StandardScaler};
use crate::error::{RecommenderError, Result};
use crate::pipeline::is_numeric_dtype;
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Preprocessing pipeline fitted on the training partition.
///
/// Splits the frozen feature columns into numeric (standard-scaled) and
/// categorical (one-hot encoded) and produces the model's input matrix with
/// a deterministic column layout: feature columns in frozen order, one-hot
/// blocks expanding in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturePipeline {
    feature_columns: Vec<String>,
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    scaler: StandardScaler,
    encoder: OneHotEncoder,
    is_fitted: bool,
}

impl FeaturePipeline {
    pub fn new(feature_columns: Vec<String>) -> Self {
        Self {
            feature_columns,
            numeric_columns: Vec::new(),
            categorical_columns: Vec::new(),
            scaler: StandardScaler::new(),
            encoder: OneHotEncoder::new(),
            is_fitted: false,
        }
    }

    /// Detect column types and fit the scaler and encoder.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.numeric_columns.clear();
        self.categorical_columns.clear();

        for col_name in &self.feature_columns {
            let column = df
                .column(col_name)
                .map_err(|_| RecommenderError::FeatureNotFound(col_name.clone()))?;
            if is_numeric_dtype(column.dtype()) {
                self.numeric_columns.push(col_name.clone());
            } else {
                self.categorical_columns.push(col_name.clone());
            }
        }

        self.scaler.fit(df, &self.numeric_columns)?;
        self.encoder.fit(df, &self.categorical_columns)?;

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform a table with the frozen feature columns into the model's
    /// input matrix.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(RecommenderError::ModelNotFitted);
        }

        let n_rows = df.height();
        let mut columns: Vec<Vec<f64>> = Vec::new();

        for col_name in &self.feature_columns {
            let column = df
                .column(col_name)
                .map_err(|_| RecommenderError::FeatureNotFound(col_name.clone()))?;
            let series = column.as_materialized_series();

            if self.numeric_columns.contains(col_name) {
                columns.push(self.scaler.transform_column(series)?);
            } else {
                columns.extend(self.encoder.transform_column(series)?);
            }
        }

        let n_cols = columns.len();
        Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
            columns[c][r]
        }))
    }

    /// Fit and transform in one step.
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Feature columns in frozen order.
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Numeric subset of the feature columns.
    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    /// Categorical subset of the feature columns.
    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    /// Names of the matrix columns after encoding, in layout order.
    pub fn output_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for col_name in &self.feature_columns {
            if self.numeric_columns.contains(col_name) {
                names.push(col_name.clone());
            } else {
                names.extend(self.encoder.output_names(col_name)?);
            }
        }
        Ok(names)
    }
}
