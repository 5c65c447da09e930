//! Column type inference and header disambiguation shared by both readers.
//!
//! Readers hand over raw cells per column; this module decides once whether
//! each column is numeric (`Int64` / `Float64`) or text (`String`).

use crate::error::Result;
use crate::table::Table;
use crate::utils::{is_integral, parse_integer_cell, parse_numeric_cell};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A single cell as read from the source file, before typing.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawCell {
    Missing,
    /// A cell the source stores as a number (spreadsheet numeric cells).
    Number(f64),
    Text(String),
}

/// Storage type chosen for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inferred {
    Int,
    Float,
    Text,
}

fn infer_column(cells: &[RawCell]) -> Inferred {
    let mut seen_value = false;
    let mut all_integral = true;

    for cell in cells {
        match cell {
            RawCell::Missing => {}
            // NaN is stored as missing, never as a value.
            RawCell::Number(value) if value.is_nan() => {}
            RawCell::Number(value) => {
                seen_value = true;
                all_integral &= is_integral(*value);
            }
            RawCell::Text(text) => match parse_numeric_cell(text) {
                None => return Inferred::Text,
                Some(value) if value.is_nan() => {}
                Some(_) => {
                    seen_value = true;
                    all_integral &= parse_integer_cell(text).is_some();
                }
            },
        }
    }

    // An all-missing column is numeric with no values.
    if seen_value && all_integral {
        Inferred::Int
    } else {
        Inferred::Float
    }
}

/// Build a typed series from raw cells.
pub(crate) fn build_series(name: &str, cells: &[RawCell]) -> Series {
    let name = PlSmallStr::from(name);

    match infer_column(cells) {
        Inferred::Int => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|cell| match cell {
                    RawCell::Missing => None,
                    RawCell::Number(value) if value.is_nan() => None,
                    RawCell::Number(value) => Some(*value as i64),
                    RawCell::Text(text) => parse_integer_cell(text),
                })
                .collect();
            Series::new(name, values)
        }
        Inferred::Float => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|cell| match cell {
                    RawCell::Missing => None,
                    RawCell::Number(value) => Some(*value).filter(|v| !v.is_nan()),
                    RawCell::Text(text) => parse_numeric_cell(text).filter(|v| !v.is_nan()),
                })
                .collect();
            Series::new(name, values)
        }
        Inferred::Text => {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|cell| match cell {
                    RawCell::Missing => None,
                    RawCell::Number(value) => Some(value.to_string()),
                    RawCell::Text(text) => Some(text.clone()),
                })
                .collect();
            Series::new(name, values)
        }
    }
}

/// Make header names unique.
///
/// Blank names become `Unnamed: {index}`. A repeated name `X` becomes `X.1`,
/// `X.2`, ... skipping any candidate already taken.
pub(crate) fn disambiguate_headers(raw: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name
        };

        let mut candidate = base.clone();
        if used.contains(&candidate) {
            let counter = counters.entry(base.clone()).or_insert(0);
            loop {
                *counter += 1;
                candidate = format!("{}.{}", base, counter);
                if !used.contains(&candidate) {
                    break;
                }
            }
            debug!("Renamed duplicate header '{}' to '{}'", base, candidate);
        }

        used.insert(candidate.clone());
        names.push(candidate);
    }

    names
}

/// Assemble a table from a raw header row and column-major raw cells.
///
/// Every column in `columns` must hold exactly `height` cells.
pub(crate) fn build_table(
    header: Vec<String>,
    columns: Vec<Vec<RawCell>>,
    height: usize,
) -> Result<Table> {
    let names = disambiguate_headers(header);
    let series: Vec<Series> = names
        .iter()
        .zip(columns.iter())
        .map(|(name, cells)| build_series(name, cells))
        .collect();

    Table::from_series(series, height)
}
