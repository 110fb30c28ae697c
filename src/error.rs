// src/error.rs

use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Structural position of a table on a company detail page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableSlot {
    /// Single-period key figures.
    Summary,
    /// Income statement series.
    Results,
    /// Balance sheet, assets side.
    Assets,
    /// Balance sheet, liabilities side.
    Liabilities,
}

impl TableSlot {
    pub const ALL: [TableSlot; 4] = [
        TableSlot::Summary,
        TableSlot::Results,
        TableSlot::Assets,
        TableSlot::Liabilities,
    ];

    pub fn number(&self) -> u8 {
        match self {
            TableSlot::Summary => 1,
            TableSlot::Results => 2,
            TableSlot::Assets => 3,
            TableSlot::Liabilities => 4,
        }
    }

    /// `table_N`, the stem every artifact of this table is named after.
    pub fn stem(&self) -> String {
        format!("table_{}", self.number())
    }
}

impl fmt::Display for TableSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table {}", self.number())
    }
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("GET {url} failed: {source}")]
    Transport {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {url} returned {status}")]
    Status { url: Url, status: StatusCode },

    #[error("{table} not found on detail page")]
    TableMissing { table: TableSlot },

    #[error("{table} has no header row")]
    EmptyTable { table: TableSlot },

    #[error("{table} has no period columns")]
    NoPeriods { table: TableSlot },

    #[error("{table} row {row} has {found} cells, header has {expected}")]
    SchemaMismatch {
        table: TableSlot,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("cannot derive previous period from label {label:?}")]
    PeriodLabel { label: String },

    #[error("balance sheet merge skipped, missing {}", join_slots(.missing))]
    MergeUnavailable { missing: Vec<TableSlot> },
}

fn join_slots(slots: &[TableSlot]) -> String {
    slots
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" and ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_stems_follow_page_order() {
        let stems: Vec<_> = TableSlot::ALL.iter().map(TableSlot::stem).collect();
        assert_eq!(stems, vec!["table_1", "table_2", "table_3", "table_4"]);
    }

    #[test]
    fn merge_unavailable_lists_every_missing_table() {
        let err = ScrapeError::MergeUnavailable {
            missing: vec![TableSlot::Assets, TableSlot::Liabilities],
        };
        assert_eq!(
            err.to_string(),
            "balance sheet merge skipped, missing table 3 and table 4"
        );
    }
}
