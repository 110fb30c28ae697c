// src/process/raw_table.rs

use crate::config::PageSelectors;
use crate::error::TableSlot;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use scraper::{ElementRef, Html, Selector};
use std::{io::Write, path::Path};
use tracing::{debug, warn};

/// A table exactly as it reads on the page: trimmed cell text, nothing parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Cells of the first `<tr>`: the label column header, then one entry per period.
    pub headers: Vec<String>,
    /// Every following `<tr>`, one String per `<th>`/`<td>`.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Read every `<tr>` of `table`, keeping header and data cells alike.
    pub fn from_element(table: ElementRef<'_>) -> Self {
        let tr = Selector::parse("tr").expect("tr selector should parse");
        let cell = Selector::parse("th, td").expect("cell selector should parse");

        let mut grid = table.select(&tr).map(|row| {
            row.select(&cell)
                .map(|c| c.text().collect::<String>().trim().to_string())
                .collect::<Vec<_>>()
        });

        let headers = grid.next().unwrap_or_default();
        let rows = grid.collect();
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Indices of data rows whose width differs from the header's.
    pub fn ragged_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.len() != self.headers.len())
            .map(|(i, _)| i)
            .collect()
    }

    /// Header + rows, verbatim. Ragged rows are written as they are.
    pub fn write_csv<W: Write>(&self, w: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().flexible(true).from_writer(w);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
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

/// The four tables of a company page, each absent when the page does not carry it.
#[derive(Debug, Default)]
pub struct DetailTables {
    pub summary: Option<RawTable>,
    pub results: Option<RawTable>,
    pub assets: Option<RawTable>,
    pub liabilities: Option<RawTable>,
}

impl DetailTables {
    pub fn get(&self, slot: TableSlot) -> Option<&RawTable> {
        match slot {
            TableSlot::Summary => self.summary.as_ref(),
            TableSlot::Results => self.results.as_ref(),
            TableSlot::Assets => self.assets.as_ref(),
            TableSlot::Liabilities => self.liabilities.as_ref(),
        }
    }

    pub fn take(&mut self, slot: TableSlot) -> Option<RawTable> {
        match slot {
            TableSlot::Summary => self.summary.take(),
            TableSlot::Results => self.results.take(),
            TableSlot::Assets => self.assets.take(),
            TableSlot::Liabilities => self.liabilities.take(),
        }
    }
}

/// Locate tables by structural position: the first summary-styled table, then the
/// first three series-styled tables in document order.
pub fn locate_tables(html: &str, selectors: &PageSelectors) -> DetailTables {
    let doc = Html::parse_document(html);

    let summary = doc
        .select(&selectors.summary_table)
        .next()
        .map(RawTable::from_element);
    let mut series = doc
        .select(&selectors.series_table)
        .map(RawTable::from_element);

    let tables = DetailTables {
        summary,
        results: series.next(),
        assets: series.next(),
        liabilities: series.next(),
    };

    for slot in TableSlot::ALL {
        if let Some(t) = tables.get(slot) {
            debug!(%slot, columns = t.headers.len(), rows = t.rows.len(), "located");
            let ragged = t.ragged_rows();
            if !ragged.is_empty() {
                warn!(%slot, ?ragged, width = t.headers.len(), "rows differ from header width");
            }
        }
    }

    tables
}
