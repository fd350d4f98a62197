//! Standard scaling for numeric feature columns

use crate::error::{RecommenderError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters for one fitted column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    mean: f64,
    std: f64,
}

/// Z-score scaler: (x - mean) / std, with std 0 treated as 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    params: HashMap<String, ScalerParams>,
    is_fitted: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            params: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Fit per-column mean and standard deviation.
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| RecommenderError::FeatureNotFound(col_name.clone()))?;
            let series = column.as_materialized_series().cast(&DataType::Float64)?;
            let ca = series.f64()?;

            let mean = ca.mean().unwrap_or(0.0);
            let std = ca.std(1).unwrap_or(1.0);
            self.params.insert(
                col_name.clone(),
                ScalerParams {
                    mean,
                    std: if std == 0.0 { 1.0 } else { std },
                },
            );
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Scale a single column using its stored parameters.
    pub fn transform_column(&self, series: &Series) -> Result<Vec<f64>> {
        if !self.is_fitted {
            return Err(RecommenderError::ModelNotFitted);
        }
        let params = self
            .params
            .get(series.name().as_str())
            .ok_or_else(|| RecommenderError::FeatureNotFound(series.name().to_string()))?;

        let cast = series.cast(&DataType::Float64).map_err(|_| {
            RecommenderError::Data(format!("column '{}' is not numeric", series.name()))
        })?;
        let ca = cast.f64()?;

        ca.into_iter()
            .map(|opt| {
                opt.map(|v| (v - params.mean) / params.std).ok_or_else(|| {
                    RecommenderError::Data(format!(
                        "null value in numeric column '{}'",
                        series.name()
                    ))
                })
            })
            .collect()
    }
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}
