// src/process/series.rs

use crate::error::{ScrapeError, TableSlot};
use crate::process::table::{NumericRow, NumericTable};
use crate::process::{convert::parse_value, fit_row, normalize::normalize_title, RawTable};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument, warn};

pub const VALUE_SUFFIX: &str = "Valeur";
pub const VARIATION_SUFFIX: &str = "Variation";

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit regex should compile"));

/// Split a series cell into `(value, variation)`.
///
/// The page prints the figure on the first line and its year-over-year change on the
/// last one. A one-line cell has no variation; an absent or blank cell has neither.
pub fn split_cell(cell: Option<&str>) -> (Option<f64>, Option<f64>) {
    let mut lines = cell
        .unwrap_or_default()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty());
    let value = lines.next().and_then(parse_value);
    let variation = lines.last().and_then(parse_value);
    (value, variation)
}

/// Value of the period before the one `value` belongs to, given `value`'s growth
/// rate as a fraction (`0.05` for +5 %). `None` when an operand is missing or the
/// rate is -100 %.
pub fn implied_prior(value: Option<f64>, variation: Option<f64>) -> Option<f64> {
    let prior = value? / (1.0 + variation?);
    prior.is_finite().then_some(prior)
}

/// `"2022"` → `"2021"`, `"FY2020"` → `"FY2019"`: the last run of digits goes down by one,
/// zero-padded to its original width.
pub fn previous_period(label: &str) -> Result<String, ScrapeError> {
    let err = || ScrapeError::PeriodLabel {
        label: label.to_string(),
    };
    let m = DIGITS.find_iter(label).last().ok_or_else(err)?;
    let n: u64 = m.as_str().parse().map_err(|_| err())?;
    let prev = n.checked_sub(1).ok_or_else(err)?;
    Ok(format!(
        "{}{:0width$}{}",
        &label[..m.start()],
        prev,
        &label[m.end()..],
        width = m.as_str().len()
    ))
}

/// Flatten a value/variation grid into one column per figure, then synthesize the
/// value of the period preceding the last one.
///
/// Output columns: the normalized label header, `"<period> Valeur"` and
/// `"<period> Variation"` for every period, with `"<prior> Valeur"` slotted in
/// right before the final variation column.
#[instrument(level = "debug", skip(raw), fields(rows = raw.rows.len()))]
pub fn process_year_series(raw: &RawTable, table: TableSlot) -> Result<NumericTable, ScrapeError> {
    let (label_header, periods) = raw
        .headers
        .split_first()
        .ok_or(ScrapeError::EmptyTable { table })?;
    let last_period = periods.last().ok_or(ScrapeError::NoPeriods { table })?;
    let prior_period = previous_period(last_period)?;

    let width = raw.headers.len();
    let mut grid = Vec::with_capacity(raw.rows.len());
    let mut rows = Vec::with_capacity(raw.rows.len());
    for (i, row) in raw.rows.iter().enumerate() {
        let mut cells: Vec<Option<&str>> = fit_row(table, i, row, width)?.collect();
        let label = normalize_title(cells.remove(0).unwrap_or_default());
        rows.push(NumericRow {
            label,
            values: Vec::with_capacity(2 * periods.len() + 1),
        });
        grid.push(cells);
    }

    // names and values grow together, one pair per period
    let mut columns = Vec::with_capacity(2 * periods.len() + 2);
    columns.push(normalize_title(label_header));
    for (p, period) in periods.iter().enumerate() {
        columns.push(format!("{period} {VALUE_SUFFIX}"));
        columns.push(format!("{period} {VARIATION_SUFFIX}"));
        for (row, cells) in rows.iter_mut().zip(&grid) {
            let (value, variation) = split_cell(cells[p]);
            row.values.push(value);
            row.values.push(variation);
        }
    }

    let prior_column = format!("{prior_period} {VALUE_SUFFIX}");
    if columns.contains(&prior_column) {
        warn!(%table, column = %prior_column, "derived column duplicates an existing period");
    }
    columns.insert(columns.len() - 1, prior_column);
    for row in &mut rows {
        let n = row.values.len();
        let prior = implied_prior(row.values[n - 2], row.values[n - 1]);
        row.values.insert(n - 1, prior);
    }

    debug!(%table, columns = columns.len(), rows = rows.len(), "series flattened");
    Ok(NumericTable { columns, rows })
}
