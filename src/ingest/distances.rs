//! Distance table ingestion.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{info, warn};

use crate::distance::LocationIndex;
use crate::error::IngestError;

/// Column where distance values (and header labels) begin.
const FIRST_VALUE_COLUMN: usize = 2;

/// Reads a distance table from a file path.
pub fn read_distances(path: impl AsRef<Path>) -> Result<LocationIndex, IngestError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    load_distances(file, &path.to_string_lossy())
}

/// Parses a square or lower-triangular distance table.
///
/// The header row is the first row whose third column holds a non-numeric
/// label; its cells from that column on name the destinations. Each
/// following data row names its source in the first column (falling back
/// to the second) and carries one distance per destination column. Blank
/// cells mean unknown; every parsed pair is mirrored into the index, so a
/// lower-triangular table reads back symmetric.
pub fn load_distances<R: Read>(reader: R, source: &str) -> Result<LocationIndex, IngestError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut index = LocationIndex::new();
    let mut labels: Vec<(usize, String)> = Vec::new();
    let mut pairs = 0usize;

    for record in csv.records() {
        let record = record?;
        let cells: Vec<&str> = record.iter().collect();
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        if labels.is_empty() {
            if is_header(&cells) {
                labels = cells
                    .iter()
                    .enumerate()
                    .skip(FIRST_VALUE_COLUMN)
                    .filter(|(_, c)| !c.trim().is_empty())
                    .map(|(col, c)| (col, c.trim().to_string()))
                    .collect();
            }
            continue;
        }

        let row_label = match (cells.first(), cells.get(1)) {
            (Some(first), _) if !first.trim().is_empty() => first.trim(),
            (_, Some(second)) if !second.trim().is_empty() => second.trim(),
            _ => continue,
        };
        for (col, to_label) in &labels {
            let Some(cell) = cells.get(*col) else {
                continue;
            };
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            match cell.parse::<f64>() {
                Ok(miles) => {
                    index.insert(row_label, to_label, miles);
                    pairs += 1;
                }
                Err(_) => warn!("ignoring non-numeric distance cell {cell:?} in {source}"),
            }
        }
        // A second label column names the same place; remember it.
        if let (Some(first), Some(second)) = (cells.first(), cells.get(1)) {
            let (first, second) = (first.trim(), second.trim());
            if !first.is_empty() && !second.is_empty() && first != second {
                index.register_alias(second, first);
            }
        }
    }

    if labels.is_empty() {
        return Err(IngestError::MissingHeader(source.to_string()));
    }
    if pairs == 0 {
        return Err(IngestError::NoRecords(source.to_string()));
    }
    info!("loaded {} locations ({pairs} pairs) from {source}", index.len());
    Ok(index)
}

/// A header row holds address labels, not numbers, past the first two
/// columns.
fn is_header(cells: &[&str]) -> bool {
    cells
        .iter()
        .skip(FIRST_VALUE_COLUMN)
        .filter(|c| !c.trim().is_empty())
        .take(2)
        .filter(|c| c.trim().parse::<f64>().is_err())
        .count()
        >= 1
}
