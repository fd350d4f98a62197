//! Raw table schema validation

use crate::error::{RecommenderError, Result};
use polars::prelude::*;
use std::collections::HashSet;

/// Check that `df` contains every column in `required`.
///
/// Fails with a `Schema` error naming the table and the sorted list of
/// missing columns. No side effects; must run before any other processing
/// of a table.
pub fn validate_columns(df: &DataFrame, required: &[&str], table_name: &str) -> Result<()> {
    let present: HashSet<&str> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .collect();

    let mut missing: Vec<String> = required
        .iter()
        .filter(|col| !present.contains(**col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        missing.sort();
        Err(RecommenderError::Schema {
            table: table_name.to_string(),
            missing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_columns_present() {
        let df = df!(
            "incentive_program" => &["A", "B"],
            "incentive_amount" => &[100.0, 200.0]
        )
        .unwrap();

        assert!(validate_columns(&df, &["incentive_program", "incentive_amount"], "incentive").is_ok());
    }

    #[test]
    fn test_missing_columns_sorted() {
        let df = df!("engagement_score" => &[1.0, 2.0]).unwrap();

        let err = validate_columns(
            &df,
            &["property_id", "owner_id", "engagement_score"],
            "behavior",
        )
        .unwrap_err();

        match err {
            crate::error::RecommenderError::Schema { table, missing } => {
                assert_eq!(table, "behavior");
                assert_eq!(missing, vec!["owner_id".to_string(), "property_id".to_string()]);
            }
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_extra_columns_ignored() {
        let df = df!(
            "property_id" => &[1i64],
            "owner_id" => &[9i64],
            "zoning" => &["residential"]
        )
        .unwrap();

        assert!(validate_columns(&df, &["property_id", "owner_id"], "property").is_ok());
    }
}
