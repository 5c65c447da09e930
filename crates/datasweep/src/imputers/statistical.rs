//! Statistical imputation methods.
//!
//! Provides column-mean imputation for numeric columns.

use crate::error::{Result, SweepError};
use crate::utils::{fill_numeric_nulls, is_numeric_dtype};
use polars::prelude::*;
use tracing::debug;

/// A column that received imputed values.
#[derive(Debug, Clone, PartialEq)]
pub struct ImputedColumn {
    pub name: String,
    pub cells_filled: usize,
    pub fill_value: f64,
}

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Apply mean imputation to one numeric column.
    ///
    /// Returns `None` when nothing was filled: the column has no missing
    /// cells, no non-missing cells to average, or is not numeric.
    pub fn apply_numeric_mean(df: &mut DataFrame, col_name: &str) -> Result<Option<ImputedColumn>> {
        let series = df.column(col_name)?.as_materialized_series().clone();

        if !is_numeric_dtype(series.dtype()) {
            return Ok(None);
        }

        let missing = series.null_count();
        if missing == 0 {
            return Ok(None);
        }

        let Some(mean_val) = series.mean() else {
            debug!("Column '{}' has no values to average, left as-is", col_name);
            return Ok(None);
        };

        Self::fill_with_value(df, col_name, mean_val, &series)?;

        Ok(Some(ImputedColumn {
            name: col_name.to_string(),
            cells_filled: missing,
            fill_value: mean_val,
        }))
    }

    /// Fill numeric column with a specific value.
    fn fill_with_value(
        df: &mut DataFrame,
        col_name: &str,
        fill_value: f64,
        series: &Series,
    ) -> Result<()> {
        let filled = fill_numeric_nulls(series, fill_value)
            .map_err(|e| SweepError::ProcessingFailed(format!("Could not fill '{}': {}", col_name, e)))?;
        df.replace(col_name, filled)?;

        debug!("Filled '{}' with mean: {:.2}", col_name, fill_value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_numeric_mean_basic() {
        let mut df = df![
            "values" => [Some(1.0), None, Some(5.0)],
        ]
        .unwrap();

        let imputed = StatisticalImputer::apply_numeric_mean(&mut df, "values")
            .unwrap()
            .unwrap();

        // Mean of [1, 5] = 3
        let values = df.column("values").unwrap();
        assert_eq!(values.null_count(), 0);
        assert_eq!(values.get(1).unwrap().try_extract::<f64>().unwrap(), 3.0);
        assert_eq!(imputed.cells_filled, 1);
        assert_eq!(imputed.fill_value, 3.0);
    }

    #[test]
    fn test_apply_numeric_mean_preserves_original_values() {
        let mut df = df![
            "values" => [Some(10.0), None, Some(20.0)],
        ]
        .unwrap();

        StatisticalImputer::apply_numeric_mean(&mut df, "values").unwrap();

        let values = df.column("values").unwrap();
        assert_eq!(values.get(0).unwrap().try_extract::<f64>().unwrap(), 10.0);
        assert_eq!(values.get(2).unwrap().try_extract::<f64>().unwrap(), 20.0);
        assert_eq!(values.get(1).unwrap().try_extract::<f64>().unwrap(), 15.0);
    }

    #[test]
    fn test_integer_column_becomes_float() {
        let mut df = df![
            "n" => [Some(1i64), Some(2), None],
        ]
        .unwrap();

        StatisticalImputer::apply_numeric_mean(&mut df, "n").unwrap();

        let column = df.column("n").unwrap();
        assert_eq!(column.dtype(), &DataType::Float64);
        assert_eq!(column.get(2).unwrap().try_extract::<f64>().unwrap(), 1.5);
    }

    #[test]
    fn test_no_nulls_keeps_integer_dtype() {
        let mut df = df![
            "n" => [1i64, 2, 3],
        ]
        .unwrap();

        let imputed = StatisticalImputer::apply_numeric_mean(&mut df, "n").unwrap();

        assert!(imputed.is_none());
        assert_eq!(df.column("n").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_all_nulls_left_as_is() {
        let mut df = df![
            "values" => [Option::<f64>::None, None, None],
        ]
        .unwrap();

        let imputed = StatisticalImputer::apply_numeric_mean(&mut df, "values").unwrap();

        assert!(imputed.is_none());
        assert_eq!(df.column("values").unwrap().null_count(), 3);
    }

    #[test]
    fn test_text_column_skipped() {
        let mut df = df![
            "s" => [Some("a"), None],
        ]
        .unwrap();

        assert!(StatisticalImputer::apply_numeric_mean(&mut df, "s").unwrap().is_none());
        assert_eq!(df.column("s").unwrap().null_count(), 1);
    }

    #[test]
    fn test_nonexistent_column_is_error() {
        let mut df = df![
            "other" => [1.0, 2.0, 3.0],
        ]
        .unwrap();

        assert!(StatisticalImputer::apply_numeric_mean(&mut df, "values").is_err());
    }
}
