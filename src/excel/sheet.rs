use std::collections::{HashMap, HashSet};

use calamine::{Data, Range};

use crate::excel::CellValue;

/// One worksheet: a header row of column names followed by data rows.
///
/// Every row holds exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    /// Zero-based worksheet position of the header's first cell
    pub origin: (usize, usize),
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            columns,
            rows,
            origin: (0, 0),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Build a table from a worksheet range, taking its first row as the header.
///
/// Columns always start at column A: blank leading columns are kept as
/// unnamed columns. Data rows without any cell content are skipped.
pub fn create_table_from_range(range: &Range<Data>, missing_markers: &[String]) -> Table {
    let (start_row, start_col) = range
        .start()
        .map_or((0, 0), |(row, col)| (row as usize, col as usize));

    let mut rows = range.rows();

    let Some(header) = rows.next() else {
        return Table::default();
    };

    let columns = header_labels(&pad_to_column_a(header, start_col));

    let data = rows
        .filter(|row| !is_blank_row(row))
        .map(|row| {
            pad_to_column_a(row, start_col)
                .iter()
                .map(|cell| CellValue::from_data(cell, missing_markers))
                .collect()
        })
        .collect();

    Table {
        columns,
        rows: data,
        origin: (start_row, 0),
    }
}

// Only truly empty cells count; marker texts like "NA" keep the row
fn is_blank_row(row: &[Data]) -> bool {
    row.iter().all(|cell| matches!(cell, Data::Empty))
}

fn pad_to_column_a(row: &[Data], start_col: usize) -> Vec<Data> {
    let mut padded = Vec::with_capacity(start_col + row.len());
    padded.resize(start_col, Data::Empty);
    padded.extend_from_slice(row);
    padded
}

// Blank headers become "Unnamed: <index>", repeats get ".1", ".2", ...
fn header_labels(header: &[Data]) -> Vec<String> {
    let labels = header.iter().enumerate().map(|(col_idx, cell)| {
        let value = CellValue::from_data(cell, &[]);
        let label = value.to_string();
        if value.is_missing() || label.is_empty() {
            format!("Unnamed: {}", col_idx)
        } else {
            label
        }
    });

    let mut taken: HashSet<String> = HashSet::with_capacity(header.len());
    let mut repeats: HashMap<String, usize> = HashMap::new();

    labels
        .map(|label| {
            if taken.insert(label.clone()) {
                return label;
            }

            let count = repeats.entry(label.clone()).or_insert(0);
            loop {
                *count += 1;
                let candidate = format!("{}.{}", label, count);
                if taken.insert(candidate.clone()) {
                    return candidate;
                }
            }
        })
        .collect()
}
