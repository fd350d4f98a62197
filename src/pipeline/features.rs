//! Feature engineering: join, global incentive context, owner aggregates

use crate::error::{RecommenderError, Result};
use crate::pipeline::{clean_tables, fill_missing, TrainingDataset, TARGET_COLUMN};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Incentive-catalog statistics captured once at training time.
///
/// Broadcast as constant columns onto every training row and persisted in
/// the artifact bundle, so the serving process never needs the original
/// incentive table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalIncentiveStats {
    pub avg_incentive_amount: f64,
    pub max_incentive_amount: f64,
    pub min_incentive_amount: f64,
    pub available_program_count: u32,
}

impl GlobalIncentiveStats {
    /// Compute stats from the cleaned incentive table.
    pub fn from_incentive_table(incentive_df: &DataFrame) -> Result<Self> {
        let amounts = incentive_df
            .column("incentive_amount")
            .map_err(|_| RecommenderError::FeatureNotFound("incentive_amount".to_string()))?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let amounts = amounts.f64()?;

        let programs = incentive_df
            .column("incentive_program")
            .map_err(|_| RecommenderError::FeatureNotFound("incentive_program".to_string()))?;

        Ok(Self {
            avg_incentive_amount: amounts.mean().unwrap_or(0.0),
            max_incentive_amount: amounts.max().unwrap_or(0.0),
            min_incentive_amount: amounts.min().unwrap_or(0.0),
            available_program_count: programs.as_materialized_series().n_unique()? as u32,
        })
    }
}

/// Clean all three raw tables and assemble the training dataset.
///
/// This is the single entry point for training-table construction; the
/// frozen feature-column list it returns is the model's input contract.
pub fn build_training_dataset(
    incentive_df: &DataFrame,
    property_df: &DataFrame,
    behavior_df: &DataFrame,
) -> Result<TrainingDataset> {
    let (clean_incentive, clean_property, clean_behavior) =
        clean_tables(incentive_df, property_df, behavior_df)?;
    build_features(&clean_incentive, &clean_property, &clean_behavior)
}

/// Build the training table from cleaned inputs.
///
/// Joins and column appends are order-preserving, so given identical inputs
/// the output column order and values are identical.
pub fn build_features(
    incentive_df: &DataFrame,
    property_df: &DataFrame,
    behavior_df: &DataFrame,
) -> Result<TrainingDataset> {
    // 1. Left join behavior onto property; one output row per behavior row.
    let (behavior_aligned, property_aligned) = align_key_dtypes(behavior_df, property_df)?;
    let mut merged = behavior_aligned.join(
        &property_aligned,
        ["owner_id", "property_id"],
        ["owner_id", "property_id"],
        JoinArgs::new(JoinType::Left),
        None,
    )?;

    // 2. Global incentive context, broadcast to every row.
    let global_stats = GlobalIncentiveStats::from_incentive_table(incentive_df)?;
    let n = merged.height();
    merged = merged
        .with_column(Series::new(
            "global_avg_incentive_amount".into(),
            vec![global_stats.avg_incentive_amount; n],
        ))?
        .clone();
    merged = merged
        .with_column(Series::new(
            "global_max_incentive_amount".into(),
            vec![global_stats.max_incentive_amount; n],
        ))?
        .clone();
    merged = merged
        .with_column(Series::new(
            "global_min_incentive_amount".into(),
            vec![global_stats.min_incentive_amount; n],
        ))?
        .clone();
    merged = merged
        .with_column(Series::new(
            "available_program_count".into(),
            vec![global_stats.available_program_count as f64; n],
        ))?
        .clone();

    // 3. Owner-level aggregates from the training behavior table only.
    let owner_stats = owner_aggregates(&behavior_aligned)?;
    merged = merged.join(
        &owner_stats,
        ["owner_id"],
        ["owner_id"],
        JoinArgs::new(JoinType::Left),
        None,
    )?;

    // 4. Synthetic interaction key, kept for compatibility and debugging.
    let interaction = interaction_key(&merged)?;
    merged = merged.with_column(interaction)?.clone();

    // 5. The join can introduce nulls for unmatched properties and owners;
    // re-impute so no null reaches the encoders.
    let training_df = fill_missing(&merged)?;

    // 6. Freeze the feature-column list: everything except the target,
    // in merge order.
    let feature_columns: Vec<String> = training_df
        .get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != TARGET_COLUMN)
        .map(|name| name.to_string())
        .collect();

    Ok(TrainingDataset {
        training_df,
        feature_columns,
        target_column: TARGET_COLUMN.to_string(),
        global_stats,
    })
}

/// Per-owner engagement aggregates, grouped in stable row order.
fn owner_aggregates(behavior_df: &DataFrame) -> Result<DataFrame> {
    let stats = behavior_df
        .clone()
        .lazy()
        .group_by_stable([col("owner_id")])
        .agg([
            col("engagement_score")
                .mean()
                .cast(DataType::Float64)
                .alias("owner_avg_engagement"),
            col("engagement_score")
                .max()
                .cast(DataType::Float64)
                .alias("owner_max_engagement"),
            col("engagement_score")
                .count()
                .cast(DataType::Float64)
                .alias("owner_interaction_count"),
        ])
        .collect()?;

    Ok(stats)
}

/// `"{owner_id}_{property_id}"` with both values stringified.
fn interaction_key(df: &DataFrame) -> Result<Series> {
    let owners = df
        .column("owner_id")?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let properties = df
        .column("property_id")?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let owners = owners.str()?;
    let properties = properties.str()?;

    let keys: StringChunked = owners
        .into_iter()
        .zip(properties.into_iter())
        .map(|(owner, property)| {
            Some(format!(
                "{}_{}",
                owner.unwrap_or("unknown"),
                property.unwrap_or("unknown")
            ))
        })
        .collect();

    Ok(keys
        .with_name("owner_property_interaction".into())
        .into_series())
}

/// Cast join keys to Float64 on both sides when their dtypes disagree
/// (imputation can promote one table's integer ids to floats).
fn align_key_dtypes(
    behavior_df: &DataFrame,
    property_df: &DataFrame,
) -> Result<(DataFrame, DataFrame)> {
    let mut behavior = behavior_df.clone();
    let mut property = property_df.clone();

    for key in ["owner_id", "property_id"] {
        let left_dtype = behavior.column(key)?.dtype().clone();
        let right_dtype = property.column(key)?.dtype().clone();
        if left_dtype == right_dtype {
            continue;
        }
        let left_cast = behavior
            .column(key)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let right_cast = property
            .column(key)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        behavior = behavior.with_column(left_cast)?.clone();
        property = property.with_column(right_cast)?.clone();
    }

    Ok((behavior, property))
}
