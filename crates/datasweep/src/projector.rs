//! Column selection.

use crate::error::{Result, SweepError};
use crate::table::Table;
use polars::prelude::*;
use std::collections::HashSet;
use tracing::debug;

/// Keeps a chosen subset of columns, in the chosen order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnProjector;

impl ColumnProjector {
    /// Return exactly the named columns, in the given order, rows intact.
    ///
    /// Every name must exist in `table`; the first one that does not is
    /// reported as [`SweepError::UnknownColumn`]. Naming a column twice is an
    /// [`SweepError::InvalidSelection`]. An empty selection yields a table
    /// with no columns and the original row count.
    pub fn project(&self, table: &Table, names: &[String]) -> Result<Table> {
        if let Some(missing) = names.iter().find(|name| !table.has_column(name)) {
            return Err(SweepError::UnknownColumn(missing.clone()));
        }

        let mut seen = HashSet::with_capacity(names.len());
        if let Some(repeated) = names.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(SweepError::InvalidSelection(format!(
                "column '{}' selected more than once",
                repeated
            )));
        }

        if names.is_empty() {
            debug!("Empty column selection, keeping {} rows", table.height());
            return Ok(Table::empty_with_height(table.height()));
        }

        let selection: Vec<PlSmallStr> = names.iter().map(|name| name.as_str().into()).collect();
        let frame = table.frame().select(selection)?;

        debug!("Selected {} of {} columns", names.len(), table.width());
        Table::from_frame(frame)
    }

    /// Apply an optional selection; `None` keeps the full table.
    pub fn project_default(&self, table: &Table, names: Option<&[String]>) -> Result<Table> {
        match names {
            Some(names) => self.project(table, names),
            None => Ok(table.clone()),
        }
    }
}

/// Select `names` from `table`.
pub fn project(table: &Table, names: &[String]) -> Result<Table> {
    ColumnProjector.project(table, names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::csv;
    use pretty_assertions::assert_eq;

    fn sample() -> Table {
        csv::decode(b"A,B,C\n1,x,2.5\n2,y,\n").unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_project_reorders() {
        let projected = project(&sample(), &names(&["C", "A"])).unwrap();

        assert_eq!(projected.column_names(), vec!["C", "A"]);
        assert_eq!(projected.height(), 2);
        assert_eq!(projected, csv::decode(b"C,A\n2.5,1\n,2\n").unwrap());
    }

    #[test]
    fn test_project_all_is_identity() {
        let table = sample();
        let projected = project(&table, &table.column_names()).unwrap();
        assert_eq!(projected, table);
    }

    #[test]
    fn test_project_unknown_column() {
        let err = project(&sample(), &names(&["A", "Z", "Y"])).unwrap_err();
        assert!(matches!(err, SweepError::UnknownColumn(ref name) if name == "Z"));
    }

    #[test]
    fn test_project_duplicate_name() {
        let err = project(&sample(), &names(&["A", "B", "A"])).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SELECTION");
    }

    #[test]
    fn test_project_empty_selection_keeps_rows() {
        let projected = project(&sample(), &[]).unwrap();
        assert_eq!(projected.shape(), (2, 0));
    }

    #[test]
    fn test_project_default_none() {
        let table = sample();
        assert_eq!(ColumnProjector.project_default(&table, None).unwrap(), table);
    }
}
