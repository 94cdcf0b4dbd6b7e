//! Package row ingestion and note-constraint parsing.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveTime;
use log::{debug, info};

use crate::error::IngestError;
use crate::models::{Constraint, Deadline, Package, PackageStore};

/// Number of columns in a package row.
const PACKAGE_COLUMNS: usize = 8;

/// Reads package rows from a file path.
pub fn read_packages(path: impl AsRef<Path>) -> Result<PackageStore, IngestError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    load_packages(file, &path.to_string_lossy())
}

/// Parses package rows from delimited input.
///
/// Tolerates preamble rows: everything before a header row (any cell
/// containing `ID`) is skipped, and only rows whose first cell is an
/// integer are treated as data. Short rows are padded with empty cells.
/// Fails with [`IngestError`] on a malformed data row or when no rows
/// parse at all.
pub fn load_packages<R: Read>(reader: R, source: &str) -> Result<PackageStore, IngestError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut store = PackageStore::new();
    let mut header_found = false;
    for record in csv.records() {
        let record = record?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        if !header_found {
            if record.iter().any(|cell| cell.contains("ID")) {
                header_found = true;
            }
            continue;
        }

        let mut cells: Vec<&str> = record.iter().map(str::trim).collect();
        cells.resize(PACKAGE_COLUMNS, "");
        let Ok(id) = cells[0].parse::<u32>() else {
            // Not a data row (footer/annotation); matches header tolerance.
            debug!("skipping non-data row at line {line}");
            continue;
        };

        let deadline = Deadline::parse(cells[5]).ok_or_else(|| IngestError::InvalidRow {
            line,
            reason: format!("bad deadline {:?}", cells[5]),
        })?;
        let weight = if cells[6].is_empty() {
            0.0
        } else {
            cells[6].parse::<f64>().map_err(|_| IngestError::InvalidRow {
                line,
                reason: format!("bad weight {:?}", cells[6]),
            })?
        };

        let package = Package::new(id, cells[1], cells[2], cells[3], cells[4])
            .with_deadline(deadline)
            .with_weight(weight)
            .with_notes(cells[7])
            .with_constraints(parse_constraints(cells[7]));
        store.insert(package);
    }

    if !header_found {
        return Err(IngestError::MissingHeader(source.to_string()));
    }
    if store.is_empty() {
        return Err(IngestError::NoRecords(source.to_string()));
    }
    info!("loaded {} packages from {source}", store.len());
    Ok(store)
}

/// Parses the free-text notes column into structured constraints.
///
/// Recognized markers (anything else carries no constraint):
/// - `Can only be on truck N`
/// - `Delayed ... 9:05 am` (a note with no parseable time yields
///   [`Constraint::DelayedUntil`]`(None)`)
/// - `Must be delivered with 15, 19`
pub fn parse_constraints(notes: &str) -> Vec<Constraint> {
    let lower = notes.to_ascii_lowercase();
    let mut constraints = Vec::new();

    if let Some(rest) = lower.split("can only be on truck").nth(1) {
        if let Some(truck) = first_number(rest) {
            constraints.push(Constraint::TruckOnly(truck as u8));
        }
    }
    if lower.contains("delayed") {
        constraints.push(Constraint::DelayedUntil(first_time(&lower)));
    }
    if let Some(rest) = lower.split("delivered with").nth(1) {
        let ids: Vec<u32> = rest
            .split(|c: char| !c.is_ascii_digit())
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse().ok())
            .collect();
        if !ids.is_empty() {
            constraints.push(Constraint::DeliverWith(ids));
        }
    }
    constraints
}

/// First integer appearing in the text.
fn first_number(text: &str) -> Option<u32> {
    text.split(|c: char| !c.is_ascii_digit())
        .find(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

/// First `H:MM am/pm` time appearing in the text.
fn first_time(text: &str) -> Option<NaiveTime> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    for pair in tokens.windows(2) {
        if !pair[0].contains(':') {
            continue;
        }
        let candidate = format!("{} {}", pair[0], pair[1]).to_ascii_uppercase();
        if let Ok(t) = NaiveTime::parse_from_str(&candidate, "%I:%M %p") {
            return Some(t);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%I:%M %p").expect("valid time")
    }

    const SAMPLE: &str = "\
Daily Local Package File,,,,,,,
Package ID,Address,City,State,Zip,Delivery Deadline,Mass KILO,Special Notes
1,195 W Oakland Ave,Salt Lake City,UT,84115,10:30 AM,21,
3,233 Canyon Rd,Salt Lake City,UT,84103,EOD,2,Can only be on truck 2
6,3060 Lester St,West Valley City,UT,84119,10:30 AM,88,Delayed on flight---will not arrive to depot until 9:05 am
14,4300 S 1300 E,Millcreek,UT,84117,10:30 AM,88,Must be delivered with 15 19
";

    #[test]
    fn test_load_packages() {
        let store = load_packages(SAMPLE.as_bytes(), "test").expect("loads");
        assert_eq!(store.len(), 4);
        assert_eq!(store.ids(), vec![1, 3, 6, 14]);

        let p1 = store.get(1).expect("present");
        assert_eq!(p1.deadline(), Deadline::By(t("10:30 AM")));
        assert_eq!(p1.weight(), 21.0);
        assert!(p1.constraints().is_empty());

        assert_eq!(store.get(3).expect("present").truck_lock(), Some(2));
        assert_eq!(store.get(6).expect("present").available_from(), Some(t("9:05 AM")));
        assert_eq!(store.get(14).expect("present").linked_ids(), &[15, 19]);
    }

    #[test]
    fn test_missing_header_fails() {
        let err = load_packages(&b"1,somewhere,SLC,UT,84101,EOD,1,\n"[..], "test")
            .expect_err("no header");
        assert!(matches!(err, IngestError::MissingHeader(_)));
    }

    #[test]
    fn test_no_records_fails() {
        let err = load_packages(&b"Package ID,Address\n,,\n"[..], "test").expect_err("empty");
        assert!(matches!(err, IngestError::NoRecords(_)));
    }

    #[test]
    fn test_bad_deadline_fails() {
        let input = "Package ID,Address,City,State,Zip,Delivery Deadline,Mass,Notes\n\
                     2,2530 S 500 E,Salt Lake City,UT,84106,whenever,44,\n";
        let err = load_packages(input.as_bytes(), "test").expect_err("bad deadline");
        assert!(matches!(err, IngestError::InvalidRow { .. }));
    }

    #[test]
    fn test_short_rows_padded() {
        let input = "Package ID,Address,City,State,Zip,Delivery Deadline\n\
                     7,1330 2100 S,Salt Lake City,UT,84106,EOD\n";
        let store = load_packages(input.as_bytes(), "test").expect("loads");
        let p = store.get(7).expect("present");
        assert_eq!(p.weight(), 0.0);
        assert_eq!(p.notes(), "");
    }

    #[test]
    fn test_parse_constraints_markers() {
        assert_eq!(parse_constraints("Can only be on truck 2"), vec![Constraint::TruckOnly(2)]);
        assert_eq!(
            parse_constraints("Delayed on flight---will not arrive to depot until 9:05 am"),
            vec![Constraint::DelayedUntil(Some(t("9:05 AM")))]
        );
        assert_eq!(parse_constraints("Delayed indefinitely"), vec![Constraint::DelayedUntil(None)]);
        assert_eq!(
            parse_constraints("Must be delivered with 13, 15"),
            vec![Constraint::DeliverWith(vec![13, 15])]
        );
        assert!(parse_constraints("").is_empty());
        assert!(parse_constraints("Fragile, this side up").is_empty());
    }

    #[test]
    fn test_wrong_address_note_carries_no_constraint() {
        assert!(parse_constraints("Wrong address listed").is_empty());
    }
}
