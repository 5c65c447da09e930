//! Data cleaning operations.
//!
//! This module provides:
//! - Removing duplicate rows
//! - Filling missing numeric values with the column mean
//!
//! Both operations are idempotent and never modify their input in place: the
//! caller swaps in the returned table only once the step has succeeded.

use crate::error::{Result, SweepError};
use crate::imputers::StatisticalImputer;
use crate::table::Table;
use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

/// What a cleaning step changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningOutcome {
    /// Rows dropped as duplicates.
    pub rows_removed: usize,
    /// Cells that received an imputed value.
    pub cells_filled: usize,
    /// Columns that received imputed values, in table order.
    pub columns_filled: Vec<String>,
    /// Human-readable summary of the step.
    pub description: String,
}

/// Cleaned table together with a report of what changed.
#[derive(Debug, Clone)]
pub struct Cleaned {
    pub table: Table,
    pub outcome: CleaningOutcome,
}

/// Data cleaner for the user-selectable cleaning steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataCleaner;

impl DataCleaner {
    /// Remove rows that equal an earlier row across all columns.
    ///
    /// Missing cells compare equal to missing cells in the same column. The
    /// first occurrence is kept and row order is preserved.
    pub fn remove_duplicates(&self, table: &Table) -> Result<Cleaned> {
        let before = table.height();

        if table.width() == 0 {
            return Ok(Cleaned {
                table: table.clone(),
                outcome: duplicate_outcome(0),
            });
        }

        let frame = table
            .frame()
            .clone()
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()
            .map_err(|e| SweepError::ProcessingFailed(format!("Duplicate removal failed: {}", e)))?;

        let table = Table::from_frame(frame)?;
        let removed = before - table.height();

        if removed > 0 {
            let pct = (removed as f64 / before as f64) * 100.0;
            info!("Removed {} duplicate rows ({:.1}%)", removed, pct);
        } else {
            debug!("No duplicate rows found");
        }

        Ok(Cleaned {
            table,
            outcome: duplicate_outcome(removed),
        })
    }

    /// Replace missing cells of every numeric column with the column mean.
    ///
    /// Text columns and numeric columns without any value are untouched.
    /// Integer columns that receive a fill become floating point.
    pub fn fill_missing_numeric(&self, table: &Table) -> Result<Cleaned> {
        let mut frame = table.frame().clone();
        let mut cells_filled = 0;
        let mut columns_filled = Vec::new();

        for name in table.numeric_column_names() {
            let imputed = StatisticalImputer::apply_numeric_mean(&mut frame, &name)
                .map_err(|e| match e {
                    SweepError::ProcessingFailed(_) => e,
                    other => SweepError::ProcessingFailed(other.to_string()),
                })?;

            if let Some(imputed) = imputed {
                debug!(
                    "Filled {} cells in '{}' with {:.4}",
                    imputed.cells_filled, imputed.name, imputed.fill_value
                );
                cells_filled += imputed.cells_filled;
                columns_filled.push(imputed.name);
            }
        }

        let description = if cells_filled > 0 {
            info!(
                "Filled {} missing values across {} numeric columns",
                cells_filled,
                columns_filled.len()
            );
            format!(
                "Filled {} missing values in {} numeric columns with the column mean",
                cells_filled,
                columns_filled.len()
            )
        } else {
            debug!("No missing numeric values to fill");
            "No missing numeric values found".to_string()
        };

        let table = if cells_filled > 0 {
            Table::from_frame(frame)?
        } else {
            table.clone()
        };

        Ok(Cleaned {
            table,
            outcome: CleaningOutcome {
                rows_removed: 0,
                cells_filled,
                columns_filled,
                description,
            },
        })
    }
}

fn duplicate_outcome(removed: usize) -> CleaningOutcome {
    let description = if removed > 0 {
        format!("Removed {} duplicate rows", removed)
    } else {
        "No duplicate rows found".to_string()
    };

    CleaningOutcome {
        rows_removed: removed,
        cells_filled: 0,
        columns_filled: Vec::new(),
        description,
    }
}

/// Remove duplicate rows from `table`.
pub fn remove_duplicates(table: &Table) -> Result<Cleaned> {
    DataCleaner.remove_duplicates(table)
}

/// Fill missing numeric cells of `table` with column means.
pub fn fill_missing_numeric(table: &Table) -> Result<Cleaned> {
    DataCleaner.fill_missing_numeric(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::csv;
    use pretty_assertions::assert_eq;

    fn table(text: &str) -> Table {
        csv::decode(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_remove_duplicates_keeps_first_in_order() {
        let input = table("A,B\n3,x\n1,y\n3,x\n2,z\n1,y\n");
        let cleaned = remove_duplicates(&input).unwrap();

        assert_eq!(cleaned.outcome.rows_removed, 2);
        assert_eq!(cleaned.table, table("A,B\n3,x\n1,y\n2,z\n"));
    }

    #[test]
    fn test_remove_duplicates_treats_missing_as_equal() {
        let input = table("A,B\n1,\n1,\n1,2\n");
        let cleaned = remove_duplicates(&input).unwrap();

        assert_eq!(cleaned.table.height(), 2);
        assert_eq!(cleaned.outcome.rows_removed, 1);
    }

    #[test]
    fn test_remove_duplicates_is_idempotent() {
        let once = remove_duplicates(&table("A\n1\n1\n2\n")).unwrap().table;
        let twice = remove_duplicates(&once).unwrap();

        assert_eq!(twice.table, once);
        assert_eq!(twice.outcome.rows_removed, 0);
        assert_eq!(twice.outcome.description, "No duplicate rows found");
    }

    #[test]
    fn test_remove_duplicates_without_columns() {
        let cleaned = remove_duplicates(&Table::empty_with_height(3)).unwrap();
        assert_eq!(cleaned.table.shape(), (3, 0));
    }

    #[test]
    fn test_fill_missing_numeric_uses_mean() {
        let input = table("A,B,C\n1,10,x\n,20,\n3,,z\n");
        let cleaned = fill_missing_numeric(&input).unwrap();

        assert_eq!(cleaned.outcome.cells_filled, 2);
        assert_eq!(cleaned.outcome.columns_filled, vec!["A", "B"]);

        let a: Vec<Option<f64>> = cleaned.table.series("A").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(a, vec![Some(1.0), Some(2.0), Some(3.0)]);
        let b: Vec<Option<f64>> = cleaned.table.series("B").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(b, vec![Some(10.0), Some(20.0), Some(15.0)]);

        // Text column keeps its missing cell
        assert_eq!(cleaned.table.series("C").unwrap().null_count(), 1);
    }

    #[test]
    fn test_fill_ignores_nan_spellings() {
        let input = table("A,B\n1,x\nNAN,y\n,z\n3,w\n");
        let cleaned = fill_missing_numeric(&input).unwrap();

        assert_eq!(cleaned.outcome.cells_filled, 2);
        let a: Vec<Option<f64>> = cleaned.table.series("A").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(a, vec![Some(1.0), Some(2.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_fill_does_not_invent_rows_for_trailing_blank_line() {
        let input = table("A,B\n1,2\n3,4\n\n");
        let cleaned = fill_missing_numeric(&input).unwrap();

        assert_eq!(cleaned.outcome.cells_filled, 0);
        assert_eq!(cleaned.table.height(), 2);
        assert_eq!(
            String::from_utf8(csv::encode(&cleaned.table).unwrap()).unwrap(),
            "A,B\n1,2\n3,4\n"
        );
    }

    #[test]
    fn test_fill_missing_numeric_skips_empty_column() {
        let input = table("A,B\n1,\n2,\n");
        let cleaned = fill_missing_numeric(&input).unwrap();

        assert_eq!(cleaned.outcome.cells_filled, 0);
        assert_eq!(cleaned.table.series("B").unwrap().null_count(), 2);
        assert_eq!(cleaned.table, input);
    }

    #[test]
    fn test_fill_missing_numeric_is_idempotent() {
        let once = fill_missing_numeric(&table("A,B\n1,x\n,y\n4,z\n")).unwrap().table;
        let twice = fill_missing_numeric(&once).unwrap();

        assert_eq!(twice.table, once);
        assert_eq!(twice.outcome.cells_filled, 0);
    }

    #[test]
    fn test_dedupe_then_fill() {
        let input = table("A,B\n1,2\n1,2\n3,\n");

        let deduped = remove_duplicates(&input).unwrap().table;
        let filled = fill_missing_numeric(&deduped).unwrap().table;

        let a: Vec<Option<i64>> = filled.series("A").unwrap().i64().unwrap().into_iter().collect();
        let b: Vec<Option<f64>> = filled.series("B").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(a, vec![Some(1), Some(3)]);
        assert_eq!(b, vec![Some(2.0), Some(2.0)]);
    }
}
