//! Chart summary of the leading numeric columns.

use crate::error::Result;
use crate::table::Table;
use crate::types::{ChartData, ChartOutcome, ChartSeries};
use crate::utils::numeric_values;
use tracing::debug;

/// Maximum number of numeric columns placed on a chart.
pub const MAX_CHART_SERIES: usize = 2;

/// Pick the first two numeric columns (one if only one exists) and pass
/// their values through unchanged, missing cells included.
pub fn summarize(table: &Table) -> Result<ChartOutcome> {
    let names: Vec<String> = table
        .numeric_column_names()
        .into_iter()
        .take(MAX_CHART_SERIES)
        .collect();

    if names.is_empty() {
        debug!("No numeric columns to chart");
        return Ok(ChartOutcome::Empty);
    }

    let series = names
        .into_iter()
        .map(|name| -> Result<ChartSeries> {
            let values = numeric_values(table.series(&name)?)?;
            Ok(ChartSeries { name, values })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Charting {} over {} rows",
        series
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        table.height()
    );

    Ok(ChartOutcome::Chart(ChartData { series }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::csv;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_numeric_columns() {
        let table = csv::decode(b"name,city\nann,oslo\n").unwrap();
        assert_eq!(summarize(&table).unwrap(), ChartOutcome::Empty);
    }

    #[test]
    fn test_first_two_numeric_columns() {
        let table = csv::decode(b"name,x,label,y,z\na,1,p,2.5,9\nb,,q,3.5,8\n").unwrap();
        let outcome = summarize(&table).unwrap();
        let data = outcome.data().unwrap();

        assert_eq!(data.column_names(), vec!["x", "y"]);
        assert_eq!(data.series[0].values, vec![Some(1.0), None]);
        assert_eq!(data.series[1].values, vec![Some(2.5), Some(3.5)]);
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_single_numeric_column() {
        let table = csv::decode(b"name,x\na,1\n").unwrap();
        let outcome = summarize(&table).unwrap();

        assert_eq!(outcome.data().unwrap().column_names(), vec!["x"]);
    }

    #[test]
    fn test_empty_table() {
        assert!(summarize(&Table::default()).unwrap().is_empty());
    }
}
