//! The value a reader hands the extractor for one row/column.
//!
//! Delimited, fixed-width, and sheet text all arrive as [`RawCell::Text`].
//! Only the XLSX reader can produce [`RawCell::Date`], for cells Excel
//! itself stores as a date rather than as text — those skip string parsing
//! entirely and go straight to rendering.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawCell {
    Text(String),
    Date(NaiveDate),
}

impl RawCell {
    pub fn text(value: impl Into<String>) -> Self {
        RawCell::Text(value.into())
    }

    /// Whether this cell is null under the pipeline's null-value set.
    /// A typed date is never null — it came from a non-empty Excel cell.
    pub fn is_null(&self) -> bool {
        match self {
            RawCell::Text(s) => crate::config::is_null(s),
            RawCell::Date(_) => false,
        }
    }
}
