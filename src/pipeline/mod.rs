//! Data pipeline: schema validation, cleaning, and feature engineering
//!
//! Turns the three raw tables (incentive catalog, property registry, owner
//! behavior log) into a single training table with a frozen, ordered
//! feature-column list. The same column set and order is the only valid
//! input shape at inference time.

mod clean;
mod features;
mod schema;

pub use clean::{clean_table, clean_tables, fill_missing};
pub use features::{build_features, build_training_dataset, GlobalIncentiveStats};
pub use schema::validate_columns;

use polars::prelude::*;

/// Target column name. Present in training data only, never at inference.
pub const TARGET_COLUMN: &str = "ideal_incentive_program";

/// Required columns per raw table. Checked before any other processing.
pub const REQUIRED_INCENTIVE_COLUMNS: &[&str] = &["incentive_program", "incentive_amount"];
pub const REQUIRED_PROPERTY_COLUMNS: &[&str] = &["property_id", "owner_id"];
pub const REQUIRED_BEHAVIOR_COLUMNS: &[&str] = &[
    "owner_id",
    "property_id",
    "engagement_score",
    "ideal_incentive_program",
];

/// Output of the pipeline: the training table plus its frozen column contract.
#[derive(Debug, Clone)]
pub struct TrainingDataset {
    /// One row per behavior record, no missing values.
    pub training_df: DataFrame,
    /// Every column except the target, in merge order. Immutable once frozen.
    pub feature_columns: Vec<String>,
    /// Name of the label column.
    pub target_column: String,
    /// Incentive-catalog constants captured at training time.
    pub global_stats: GlobalIncentiveStats,
}

/// True for any polars numeric dtype.
pub(crate) fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}
