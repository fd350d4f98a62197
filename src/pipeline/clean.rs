//! Table cleaning: deduplication, string trimming, missing-value imputation

use crate::error::Result;
use crate::pipeline::{
    is_numeric_dtype, REQUIRED_BEHAVIOR_COLUMNS, REQUIRED_INCENTIVE_COLUMNS,
    REQUIRED_PROPERTY_COLUMNS,
};
use super::schema::validate_columns;
use polars::prelude::*;
use std::collections::HashMap;

/// Validate and clean all three raw tables.
///
/// Each table is processed independently: duplicate rows dropped (first
/// occurrence kept, row order preserved), string fields trimmed, missing
/// values imputed from that table's own statistics. Statistics are never
/// shared across tables.
pub fn clean_tables(
    incentive_df: &DataFrame,
    property_df: &DataFrame,
    behavior_df: &DataFrame,
) -> Result<(DataFrame, DataFrame, DataFrame)> {
    validate_columns(incentive_df, REQUIRED_INCENTIVE_COLUMNS, "Raw incentive data")?;
    validate_columns(property_df, REQUIRED_PROPERTY_COLUMNS, "Raw property data")?;
    validate_columns(behavior_df, REQUIRED_BEHAVIOR_COLUMNS, "User behavior data")?;

    Ok((
        clean_table(incentive_df)?,
        clean_table(property_df)?,
        clean_table(behavior_df)?,
    ))
}

/// Deduplicate, trim, and impute a single table. Idempotent on clean input.
pub fn clean_table(df: &DataFrame) -> Result<DataFrame> {
    let deduped = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
    let trimmed = trim_strings(&deduped)?;
    fill_missing(&trimmed)
}

/// Strip leading/trailing whitespace from every string column.
fn trim_strings(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();

    for col in df.get_columns() {
        if col.dtype() != &DataType::String {
            continue;
        }
        let series = col.as_materialized_series();
        let ca = series.str()?;
        let trimmed: StringChunked = ca.into_iter().map(|opt| opt.map(str::trim)).collect();
        result = result
            .with_column(trimmed.with_name(series.name().clone()).into_series())?
            .clone();
    }

    Ok(result)
}

/// Impute missing values per column.
///
/// Numeric columns take the column median over non-missing values (0 when
/// the column is entirely null); an integer column with nulls is cast to
/// Float64 so a fractional median is representable. Other columns take the
/// most frequent value, tie broken toward the lexicographically smallest,
/// falling back to the literal `"unknown"`. Columns without nulls are left
/// untouched, so refilling an already-filled table is a no-op.
pub fn fill_missing(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();

    for col in df.get_columns() {
        if col.null_count() == 0 {
            continue;
        }
        let series = col.as_materialized_series();

        let filled = if is_numeric_dtype(col.dtype()) {
            fill_numeric(series)?
        } else {
            fill_categorical(series)?
        };

        result = result.with_column(filled)?.clone();
    }

    Ok(result)
}

fn fill_numeric(series: &Series) -> Result<Series> {
    let ca = series.cast(&DataType::Float64)?;
    let ca = ca.f64()?;
    let fill = ca.median().unwrap_or(0.0);

    let filled: Float64Chunked = ca
        .into_iter()
        .map(|opt| Some(opt.unwrap_or(fill)))
        .collect();

    Ok(filled.with_name(series.name().clone()).into_series())
}

fn fill_categorical(series: &Series) -> Result<Series> {
    // Non-string categoricals (e.g. booleans) are stringified first.
    let ca = series.cast(&DataType::String)?;
    let ca = ca.str()?;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in ca.into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }

    let fill = counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(value, _)| value.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let filled: StringChunked = ca
        .into_iter()
        .map(|opt| Some(opt.unwrap_or(fill.as_str())))
        .collect();

    Ok(filled.with_name(series.name().clone()).into_series())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_rows_removed() {
        let df = df!(
            "a" => &[1i64, 1, 2],
            "b" => &["x", "x", "y"]
        )
        .unwrap();

        let cleaned = clean_table(&df).unwrap();
        assert_eq!(cleaned.height(), 2);
    }

    #[test]
    fn test_string_trimming() {
        let df = df!(
            "program" => &["  A ", "B", " C"],
            "amount" => &[1.0, 2.0, 3.0]
        )
        .unwrap();

        let cleaned = clean_table(&df).unwrap();
        let programs: Vec<&str> = cleaned
            .column("program")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect();
        assert_eq!(programs, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_numeric_median_imputation() {
        let df = df!(
            "score" => &[Some(1.0), None, Some(3.0), Some(5.0)]
        )
        .unwrap();

        let cleaned = clean_table(&df).unwrap();
        let scores = cleaned.column("score").unwrap().f64().unwrap();
        assert_eq!(scores.null_count(), 0);
        assert_eq!(scores.get(1).unwrap(), 3.0);
    }

    #[test]
    fn test_all_null_numeric_column_filled_with_zero() {
        let df = df!(
            "score" => &[None::<f64>, None, None]
        )
        .unwrap();

        let cleaned = clean_table(&df).unwrap();
        let scores = cleaned.column("score").unwrap().f64().unwrap();
        assert!(scores.into_iter().all(|v| v == Some(0.0)));
    }

    #[test]
    fn test_categorical_mode_imputation() {
        // The id column keeps the two NYC rows distinct through dedup.
        let df = df!(
            "id" => &[1i64, 2, 3, 4],
            "city" => &[Some("NYC"), Some("NYC"), None, Some("LA")]
        )
        .unwrap();

        let cleaned = clean_table(&df).unwrap();
        let cities = cleaned.column("city").unwrap().str().unwrap();
        assert_eq!(cities.get(2).unwrap(), "NYC");
    }

    #[test]
    fn test_single_column_mode_counts_deduped_rows() {
        // Without a distinguishing column the duplicate NYC row is dropped
        // first, so the mode tie resolves to the smaller value.
        let df = df!(
            "city" => &[Some("NYC"), Some("NYC"), None, Some("LA")]
        )
        .unwrap();

        let cleaned = clean_table(&df).unwrap();
        let cities = cleaned.column("city").unwrap().str().unwrap();
        assert_eq!(cities.get(1).unwrap(), "LA");
    }

    #[test]
    fn test_mode_tie_breaks_lexicographically() {
        let df = df!(
            "city" => &[Some("LA"), Some("NYC"), None]
        )
        .unwrap();

        let cleaned = clean_table(&df).unwrap();
        let cities = cleaned.column("city").unwrap().str().unwrap();
        assert_eq!(cities.get(2).unwrap(), "LA");
    }

    #[test]
    fn test_all_null_categorical_column_filled_with_unknown() {
        let df = df!(
            "city" => &[None::<&str>, None]
        )
        .unwrap();

        let cleaned = clean_table(&df).unwrap();
        let cities = cleaned.column("city").unwrap().str().unwrap();
        assert!(cities.into_iter().all(|v| v == Some("unknown")));
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let df = df!(
            "score" => &[Some(1.0), None, Some(3.0), Some(1.0)],
            "city" => &[Some(" NYC "), Some("LA"), None, Some(" NYC ")]
        )
        .unwrap();

        let once = clean_table(&df).unwrap();
        let twice = clean_table(&once).unwrap();
        assert!(once.equals(&twice));
    }
}
