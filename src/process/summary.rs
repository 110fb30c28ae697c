// src/process/summary.rs

use crate::error::{ScrapeError, TableSlot};
use crate::process::{convert::parse_value, fit_row, normalize::normalize_title, RawTable};
use crate::process::table::NumericTable;
use tracing::instrument;

/// Single-period key figures: labels normalized, every other cell parsed as a number.
/// Column names are kept exactly as the page prints them.
#[instrument(level = "debug", skip(raw), fields(rows = raw.rows.len()))]
pub fn process_summary(raw: &RawTable) -> Result<NumericTable, ScrapeError> {
    let table = TableSlot::Summary;
    if raw.is_empty() {
        return Err(ScrapeError::EmptyTable { table });
    }

    let width = raw.headers.len();
    let mut out = NumericTable::new(raw.headers.clone());

    for (i, row) in raw.rows.iter().enumerate() {
        let mut cells = fit_row(table, i, row, width)?;
        let label = normalize_title(cells.next().flatten().unwrap_or_default());
        let values = cells.map(|c| c.and_then(parse_value)).collect();
        out.push_row(label, values);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn parses_every_value_cell() -> Result<(), ScrapeError> {
        let grid = raw(
            &["Indicateur", "2023"],
            &[
                &["Chiffre d'affaires", "2.5 M"],
                &["Marge brute", "12%"],
                &["Effectif", "n.c."],
            ],
        );

        let t = process_summary(&grid)?;

        assert_eq!(t.columns, vec!["Indicateur", "2023"]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.rows[0].label, "chiffre_d_affaires");
        assert_eq!(t.rows[0].values, vec![Some(2_500_000.0)]);
        assert_eq!(t.rows[1].label, "marge_brute");
        assert!((t.rows[1].values[0].unwrap() - 0.12).abs() < 1e-12);
        assert_eq!(t.rows[2].values, vec![None]);
        Ok(())
    }

    #[test]
    fn short_rows_are_padded() -> Result<(), ScrapeError> {
        let grid = raw(&["Indicateur", "2023", "2022"], &[&["Résultat", "1 K"]]);
        let t = process_summary(&grid)?;
        assert_eq!(t.rows[0].values, vec![Some(1_000.0), None]);
        Ok(())
    }

    #[test]
    fn long_rows_are_structural_errors() {
        let grid = raw(&["Indicateur", "2023"], &[&["ok", "1"], &["Résultat", "1 K", "2 K"]]);
        assert!(matches!(
            process_summary(&grid),
            Err(ScrapeError::SchemaMismatch { row: 1, expected: 2, found: 3, .. })
        ));
    }

    #[test]
    fn empty_grid_is_rejected() {
        assert!(matches!(
            process_summary(&RawTable::default()),
            Err(ScrapeError::EmptyTable { table: TableSlot::Summary })
        ));
    }
}
