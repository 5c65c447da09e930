//! Imputation module for handling missing values.
//!
//! Numeric columns are filled with their mean; text columns are never imputed.

mod statistical;

pub use statistical::{ImputedColumn, StatisticalImputer};
