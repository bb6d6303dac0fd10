//! Rectangular activity table
//!
//! Pivots a [`CountTable`] into one row per observed date (ascending) and one
//! column per category observed anywhere. Cells with no occurrence are blank,
//! not zero.

use crate::aggregate::CountTable;
use crate::error::QuantifyError;
use crate::types::Category;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Write;

/// Header of the date column
pub const DATE_COLUMN: &str = "date";

/// One table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub date: NaiveDate,
    /// One cell per column; `None` renders blank
    pub cells: Vec<Option<u64>>,
}

/// Date x category table ready to be written out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityTable {
    pub columns: Vec<Category>,
    pub rows: Vec<TableRow>,
}

impl ActivityTable {
    /// Build the table from aggregated counts
    pub fn from_counts(counts: &CountTable) -> Self {
        let columns: Vec<Category> = counts.categories().into_iter().collect();

        let rows = counts
            .days()
            .map(|(date, day)| TableRow {
                date: *date,
                cells: columns.iter().map(|c| day.get(c).copied()).collect(),
            })
            .collect();

        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value for a date and category, `None` when blank or absent
    pub fn cell(&self, date: NaiveDate, category: Category) -> Option<u64> {
        let column = self.columns.iter().position(|c| *c == category)?;
        let row = self.rows.iter().find(|r| r.date == date)?;
        row.cells.get(column).copied().flatten()
    }

    /// Write the table as CSV with a `date` column first
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), QuantifyError> {
        let mut csv = csv::Writer::from_writer(writer);

        let mut header = vec![DATE_COLUMN.to_string()];
        header.extend(self.columns.iter().map(|c| c.as_str().to_string()));
        csv.write_record(&header)?;

        for row in &self.rows {
            let mut record = vec![row.date.format("%Y-%m-%d").to_string()];
            record.extend(
                row.cells
                    .iter()
                    .map(|cell| cell.map(|n| n.to_string()).unwrap_or_default()),
            );
            csv.write_record(&record)?;
        }

        csv.flush()?;
        Ok(())
    }

    /// Render the table as a CSV string
    pub fn to_csv_string(&self) -> Result<String, QuantifyError> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| QuantifyError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

/// Registered categories that never occurred, in registry order
pub fn zero_matches(counts: &CountTable, registered: &[Category]) -> Vec<Category> {
    let seen: BTreeSet<Category> = counts.categories();
    registered
        .iter()
        .copied()
        .filter(|c| !seen.contains(c))
        .collect()
}
