use std::collections::HashMap;
use std::io::Read;

use csv::StringRecord;

use super::normalizer::normalize_cell;
use super::ImportError;

/// A header-mapped CSV table with normalized cells.
#[derive(Debug)]
pub(crate) struct Table {
    name: &'static str,
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<StringRecord>,
}

pub(crate) fn parse_table<R: Read>(name: &'static str, reader: R) -> Result<Table, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(normalize_cell).collect();
    let index = headers
        .iter()
        .enumerate()
        .map(|(position, header)| (header.clone(), position))
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        rows.push(record);
    }

    Ok(Table {
        name,
        headers,
        index,
        rows,
    })
}

impl Table {
    pub(crate) fn headers(&self) -> &[String] {
        &self.headers
    }

    pub(crate) fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    /// Position of a mapped column; a missing column is fatal.
    pub(crate) fn column(&self, column: &str) -> Result<usize, ImportError> {
        self.index
            .get(column)
            .copied()
            .ok_or_else(|| ImportError::MissingColumn {
                table: self.name,
                column: column.to_string(),
            })
    }

    pub(crate) fn cell(row: &StringRecord, position: usize) -> String {
        row.get(position).map(normalize_cell).unwrap_or_default()
    }
}
