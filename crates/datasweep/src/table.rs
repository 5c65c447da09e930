//! In-memory table shared by every pipeline step.
//!
//! A [`Table`] wraps a polars [`DataFrame`] whose columns are restricted to
//! `Int64`, `Float64` (numeric) or `String` (text). Missing cells are polars
//! nulls. Column names are unique and every column has the same height,
//! both of which the `DataFrame` itself guarantees.

use crate::error::{Result, SweepError};
use crate::types::{ColumnInfo, ColumnKind};
use crate::utils::{any_value_to_json, is_integer_dtype, is_numeric_dtype};
use polars::prelude::*;
use serde_json::Value;

/// Ordered collection of named, typed columns with a uniform row count.
#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            frame: DataFrame::empty(),
        }
    }
}

impl Table {
    /// Wrap a DataFrame, normalizing column storage.
    ///
    /// Integer columns become `Int64`, float columns `Float64`, and any
    /// other type is stored as text.
    pub fn from_frame(frame: DataFrame) -> Result<Self> {
        let height = frame.height();
        let mut columns: Vec<Column> = Vec::with_capacity(frame.width());

        for column in frame.get_columns() {
            let dtype = column.dtype();
            let target = if is_integer_dtype(dtype) {
                DataType::Int64
            } else if is_numeric_dtype(dtype) {
                DataType::Float64
            } else {
                DataType::String
            };

            if dtype == &target {
                columns.push(column.clone());
            } else {
                columns.push(column.cast(&target)?);
            }
        }

        if columns.is_empty() {
            return Ok(Self::empty_with_height(height));
        }

        Ok(Self {
            frame: DataFrame::new(columns)?,
        })
    }

    /// A table with no columns that still carries `height` rows.
    pub fn empty_with_height(height: usize) -> Self {
        Self {
            frame: DataFrame::empty_with_height(height),
        }
    }

    /// Build a table from already-normalized series.
    pub(crate) fn from_series(series: Vec<Series>, height: usize) -> Result<Self> {
        if series.is_empty() {
            return Ok(Self::empty_with_height(height));
        }
        let columns: Vec<Column> = series.into_iter().map(Column::from).collect();
        Ok(Self {
            frame: DataFrame::new(columns)?,
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height(), self.width())
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame
            .get_column_names()
            .into_iter()
            .any(|col| col.as_str() == name)
    }

    /// Get a column as a Series.
    pub fn series(&self, name: &str) -> Result<&Series> {
        if !self.has_column(name) {
            return Err(SweepError::UnknownColumn(name.to_string()));
        }
        Ok(self.frame.column(name)?.as_materialized_series())
    }

    /// Inferred kind of a column.
    pub fn column_kind(&self, name: &str) -> Result<ColumnKind> {
        Ok(kind_of(self.series(name)?.dtype()))
    }

    /// Names of numeric columns, in table order.
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.frame
            .get_columns()
            .iter()
            .filter(|col| is_numeric_dtype(col.dtype()))
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Preview metadata for every column.
    pub fn columns(&self) -> Vec<ColumnInfo> {
        self.frame
            .get_columns()
            .iter()
            .map(|col| ColumnInfo {
                name: col.name().to_string(),
                kind: kind_of(col.dtype()),
                dtype: col.dtype().to_string(),
                missing_count: col.null_count(),
            })
            .collect()
    }

    /// Total number of missing cells across all columns.
    pub fn missing_count(&self) -> usize {
        self.frame
            .get_columns()
            .iter()
            .map(|col| col.null_count())
            .sum()
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        if self.width() == 0 {
            return Self::empty_with_height(self.height().min(n));
        }
        Self {
            frame: self.frame.head(Some(n)),
        }
    }

    /// The first `n` rows as JSON values, one inner vector per row.
    pub fn preview_rows(&self, n: usize) -> Vec<Vec<Value>> {
        let count = n.min(self.height());
        let mut rows = Vec::with_capacity(count);

        for row_idx in 0..count {
            let mut row = Vec::with_capacity(self.width());
            for col in self.frame.get_columns() {
                let value = col.get(row_idx).ok().map_or(Value::Null, any_value_to_json);
                row.push(value);
            }
            rows.push(row);
        }

        rows
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        if self.shape() != other.shape() {
            return false;
        }
        if self.width() == 0 {
            return true;
        }
        let same_schema = self
            .frame
            .get_columns()
            .iter()
            .zip(other.frame.get_columns())
            .all(|(a, b)| a.name() == b.name() && a.dtype() == b.dtype());

        same_schema && self.frame.equals_missing(&other.frame)
    }
}

fn kind_of(dtype: &DataType) -> ColumnKind {
    if is_numeric_dtype(dtype) {
        ColumnKind::Numeric
    } else {
        ColumnKind::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let frame = df![
            "A" => [Some(1i32), Some(2), None],
            "B" => [Some(0.5f32), None, Some(1.5)],
            "C" => ["x", "y", "z"],
        ]
        .unwrap();
        Table::from_frame(frame).unwrap()
    }

    #[test]
    fn test_from_frame_normalizes_dtypes() {
        let table = sample();
        let dtypes: Vec<DataType> = table
            .frame()
            .get_columns()
            .iter()
            .map(|c| c.dtype().clone())
            .collect();
        assert_eq!(dtypes, vec![DataType::Int64, DataType::Float64, DataType::String]);
    }

    #[test]
    fn test_column_kinds() {
        let table = sample();
        assert_eq!(table.column_kind("A").unwrap(), ColumnKind::Numeric);
        assert_eq!(table.column_kind("C").unwrap(), ColumnKind::Text);
        assert!(matches!(
            table.column_kind("Z"),
            Err(SweepError::UnknownColumn(ref name)) if name == "Z"
        ));
        assert_eq!(table.numeric_column_names(), vec!["A", "B"]);
    }

    #[test]
    fn test_columns_metadata() {
        let columns = sample().columns();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].missing_count, 1);
        assert_eq!(columns[2].kind, ColumnKind::Text);
    }

    #[test]
    fn test_preview_rows() {
        let rows = sample().preview_rows(2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![serde_json::json!(1), serde_json::json!(0.5), serde_json::json!("x")]);
        assert_eq!(rows[1][1], Value::Null);
    }

    #[test]
    fn test_empty_with_height() {
        let table = Table::empty_with_height(4);
        assert_eq!(table.shape(), (4, 0));
        assert_eq!(table.head(2).height(), 2);
    }

    #[test]
    fn test_equality_is_null_aware() {
        assert_eq!(sample(), sample());

        let other = Table::from_frame(df!["A" => [1i64, 2, 3]].unwrap()).unwrap();
        assert_ne!(sample(), other);
    }
}
