// src/process/mod.rs

pub mod convert;
pub mod normalize;
pub mod raw_table;
pub mod series;
pub mod summary;
pub mod table;

pub use convert::parse_value;
pub use normalize::normalize_title;
pub use raw_table::{locate_tables, DetailTables, RawTable};
pub use series::process_year_series;
pub use summary::process_summary;
pub use table::{merge_balance_sheet, NumericRow, NumericTable, BALANCE_SHEET_LABEL};

use crate::error::{ScrapeError, TableSlot};
use tracing::warn;

/// Yield exactly `width` cells for `row`, padding short rows with `None`.
/// A row wider than the header cannot be named and fails the whole table.
pub(crate) fn fit_row<'a>(
    table: TableSlot,
    index: usize,
    row: &'a [String],
    width: usize,
) -> Result<impl Iterator<Item = Option<&'a str>>, ScrapeError> {
    if row.len() > width {
        return Err(ScrapeError::SchemaMismatch {
            table,
            row: index,
            expected: width,
            found: row.len(),
        });
    }
    if row.len() < width {
        warn!(%table, row = index, expected = width, found = row.len(), "padding short row");
    }
    Ok((0..width).map(move |i| row.get(i).map(String::as_str)))
}
