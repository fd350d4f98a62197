//! Crate-wide error types

use thiserror::Error;

/// Errors produced by the pipeline, trainer, and recommender
#[derive(Error, Debug)]
pub enum RecommenderError {
    /// A raw input table lacks required columns. The missing list is sorted.
    #[error("{table} missing columns: {missing:?}")]
    Schema { table: String, missing: Vec<String> },

    /// An inference request omits required feature columns.
    #[error("missing required features: {missing:?}")]
    Validation { missing: Vec<String> },

    /// Training cannot proceed (empty table, insufficient class diversity).
    #[error("training error: {0}")]
    Training(String),

    /// The model bundle file is absent at load time. Fatal at startup.
    #[error("model artifact not found at {0}")]
    ArtifactNotFound(String),

    /// A fitted component was used before fitting.
    #[error("component is not fitted")]
    ModelNotFitted,

    /// A named column is absent from a table at transform time.
    #[error("feature not found: {0}")]
    FeatureNotFound(String),

    /// Generic data-processing failure.
    #[error("data error: {0}")]
    Data(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RecommenderError>;
