//! Shared utilities for the sweeping pipeline.
//!
//! This module contains common helper functions used across the codec,
//! cleaner and table modules.

use polars::prelude::*;
use serde_json::{Number, Value};

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
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
    )
}

// =============================================================================
// Cell Parsing Utilities
// =============================================================================

/// Cell contents that are read as a missing value.
pub const MISSING_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Check if a raw cell should be read as missing.
///
/// # Example
///
/// ```rust,ignore
/// use datasweep::utils::is_missing_marker;
///
/// assert!(is_missing_marker("  "));
/// assert!(is_missing_marker("N/A"));
/// assert!(!is_missing_marker("0"));
/// ```
pub fn is_missing_marker(s: &str) -> bool {
    let trimmed = s.trim();
    MISSING_MARKERS.contains(&trimmed)
}

/// Parse a cell as an integer, if it is written as one.
pub fn parse_integer_cell(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok()
}

/// Parse a cell as a number.
pub fn parse_numeric_cell(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// True when `value` is finite, whole, and exactly representable as `i64`.
pub fn is_integral(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always a `Float64` series named like the input.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let mask = series.is_null();
    let len = series.len();
    let mut result_vec = Vec::with_capacity(len);

    for i in 0..len {
        if mask.get(i).unwrap_or(false) {
            result_vec.push(Some(fill_value));
        } else {
            let val = series.get(i)?;
            result_vec.push(Some(val.try_extract::<f64>()?));
        }
    }

    Ok(Series::new(series.name().clone(), result_vec))
}

/// Read a numeric Series as optional `f64` values, nulls preserved.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().collect())
}

// =============================================================================
// JSON Conversion
// =============================================================================

/// Converts a Polars `AnyValue` to a JSON `Value` for previews.
///
/// NaN and infinite floats become `null`; types without a JSON
/// counterpart are stringified.
pub fn any_value_to_json(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::Int8(i) => Value::Number(i.into()),
        AnyValue::Int16(i) => Value::Number(i.into()),
        AnyValue::Int32(i) => Value::Number(i.into()),
        AnyValue::Int64(i) => Value::Number(i.into()),
        AnyValue::UInt8(u) => Value::Number(u.into()),
        AnyValue::UInt16(u) => Value::Number(u.into()),
        AnyValue::UInt32(u) => Value::Number(u.into()),
        AnyValue::UInt64(u) => Value::Number(u.into()),
        AnyValue::Float32(f) => Number::from_f64(f as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::Float64(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        _ => Value::String(format!("{}", value)),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
        assert!(is_integer_dtype(&DataType::UInt8));
        assert!(!is_integer_dtype(&DataType::Float32));
    }

    #[test]
    fn test_is_missing_marker() {
        assert!(is_missing_marker(""));
        assert!(is_missing_marker("   "));
        assert!(is_missing_marker("NaN"));
        assert!(is_missing_marker(" N/A "));
        assert!(is_missing_marker("null"));
        assert!(!is_missing_marker("0"));
        assert!(!is_missing_marker("missing"));
    }

    #[test]
    fn test_parse_numeric_cell() {
        assert_eq!(parse_numeric_cell("42"), Some(42.0));
        assert_eq!(parse_numeric_cell(" -1.5 "), Some(-1.5));
        assert_eq!(parse_numeric_cell("1e3"), Some(1000.0));
        assert_eq!(parse_numeric_cell(""), None);
        assert_eq!(parse_numeric_cell("$1,234"), None);
        assert_eq!(parse_integer_cell("7"), Some(7));
        assert_eq!(parse_integer_cell("7.0"), None);
    }

    #[test]
    fn test_is_integral() {
        assert!(is_integral(3.0));
        assert!(is_integral(-12.0));
        assert!(!is_integral(2.5));
        assert!(!is_integral(f64::INFINITY));
    }

    #[test]
    fn test_fill_numeric_nulls() {
        let series = Series::new("test".into(), &[Some(1.0), None, Some(3.0)]);
        let filled = fill_numeric_nulls(&series, 0.0).unwrap();

        assert_eq!(filled.get(0).unwrap().try_extract::<f64>().unwrap(), 1.0);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 0.0);
        assert_eq!(filled.get(2).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn test_fill_numeric_nulls_from_integers() {
        let series = Series::new("ints".into(), &[Some(1i64), None]);
        let filled = fill_numeric_nulls(&series, 0.5).unwrap();

        assert_eq!(filled.dtype(), &DataType::Float64);
        assert_eq!(filled.null_count(), 0);
    }

    #[test]
    fn test_numeric_values_keeps_nulls() {
        let series = Series::new("n".into(), &[Some(1i64), None, Some(3)]);
        assert_eq!(numeric_values(&series).unwrap(), vec![Some(1.0), None, Some(3.0)]);
    }

    #[test]
    fn test_any_value_to_json() {
        assert_eq!(any_value_to_json(AnyValue::Null), Value::Null);
        assert_eq!(any_value_to_json(AnyValue::Int64(4)), serde_json::json!(4));
        assert_eq!(any_value_to_json(AnyValue::Float64(f64::NAN)), Value::Null);
        assert_eq!(any_value_to_json(AnyValue::String("x")), serde_json::json!("x"));
    }
}
