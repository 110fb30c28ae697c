// src/process/table.rs

use crate::error::{ScrapeError, TableSlot};
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::{io::Write, path::Path};
use tracing::warn;

/// First column name of the merged assets + liabilities table.
pub const BALANCE_SHEET_LABEL: &str = "Actif/Passif";

/// One row of a numeric table: a canonical label plus one value per data column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericRow {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

/// A labelled numeric table. `columns[0]` names the label column; every row carries
/// `columns.len() - 1` values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericTable {
    pub columns: Vec<String>,
    pub rows: Vec<NumericRow>,
}

impl NumericTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, label: String, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len() + 1, self.columns.len());
        self.rows.push(NumericRow { label, values });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of the named data column, `None` if no such column.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.columns.iter().skip(1).position(|c| c == name)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    /// Drop every column whose name mentions "variation", whatever the case.
    /// The label column always survives.
    pub fn without_variations(&self) -> NumericTable {
        let keep: Vec<usize> = self
            .columns
            .iter()
            .skip(1)
            .enumerate()
            .filter(|(_, name)| !name.to_lowercase().contains("variation"))
            .map(|(i, _)| i)
            .collect();

        let mut columns = Vec::with_capacity(keep.len() + 1);
        columns.extend(self.columns.first().cloned());
        columns.extend(keep.iter().map(|&i| self.columns[i + 1].clone()));

        let rows = self
            .rows
            .iter()
            .map(|r| NumericRow {
                label: r.label.clone(),
                values: keep.iter().map(|&i| r.values[i]).collect(),
            })
            .collect();

        NumericTable { columns, rows }
    }

    /// Header + one record per row, missing values left empty.
    pub fn write_csv<W: Write>(&self, w: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().from_writer(w);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            let mut record = Vec::with_capacity(row.values.len() + 1);
            record.push(row.label.clone());
            record.extend(
                row.values
                    .iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
            );
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_csv_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        self.write_csv(file)
            .with_context(|| format!("writing {}", path.display()))
    }
}

/// Stack the assets table on top of the liabilities table under a shared label column.
pub fn merge_balance_sheet(
    assets: Option<&NumericTable>,
    liabilities: Option<&NumericTable>,
) -> Result<NumericTable, ScrapeError> {
    let (assets, liabilities) = match (assets, liabilities) {
        (Some(a), Some(l)) => (a, l),
        (a, l) => {
            let missing = [(TableSlot::Assets, a.is_none()), (TableSlot::Liabilities, l.is_none())]
                .into_iter()
                .filter_map(|(slot, absent)| absent.then_some(slot))
                .collect();
            return Err(ScrapeError::MergeUnavailable { missing });
        }
    };

    if assets.columns.len() != liabilities.columns.len() {
        return Err(ScrapeError::SchemaMismatch {
            table: TableSlot::Liabilities,
            row: 0,
            expected: assets.columns.len(),
            found: liabilities.columns.len(),
        });
    }
    if assets.columns.get(1..) != liabilities.columns.get(1..) {
        warn!(
            assets = ?assets.columns,
            liabilities = ?liabilities.columns,
            "balance sheet columns differ, stacking by position"
        );
    }

    let mut columns = assets.columns.clone();
    if let Some(first) = columns.first_mut() {
        *first = BALANCE_SHEET_LABEL.to_string();
    }

    let rows = assets
        .rows
        .iter()
        .chain(liabilities.rows.iter())
        .cloned()
        .collect();

    Ok(NumericTable { columns, rows })
}
