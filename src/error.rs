//! Crate error taxonomy.
//!
//! Ingestion faults abort startup; routing and capacity faults surface as
//! [`DispatchError`] from the dispatch run; query faults are plain
//! `Option`/parse results at the call site and never reach these types.

use thiserror::Error;

/// A fault while ingesting package or distance data.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Underlying I/O failure opening or reading a data file.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited input.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// No header row could be located in the input.
    #[error("no header row found in {0}")]
    MissingHeader(String),

    /// A data row was present but could not be parsed.
    #[error("invalid row at line {line}: {reason}")]
    InvalidRow {
        /// 1-based line within the input.
        line: usize,
        /// What failed to parse.
        reason: String,
    },

    /// The input parsed but contained no usable records.
    #[error("no records found in {0}")]
    NoRecords(String),
}

/// A fault raised by assignment or routing.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Data ingestion failed; the system never starts on partial data.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// An assignment would exceed a truck's hard capacity.
    #[error("truck {truck} assigned {assigned} packages, capacity is {capacity}")]
    CapacityExceeded {
        /// Truck whose capacity would be exceeded.
        truck: u8,
        /// Number of packages assigned.
        assigned: usize,
        /// The truck's hard capacity.
        capacity: usize,
    },

    /// A referenced package id was never ingested.
    #[error("unknown package {0}")]
    UnknownPackage(u32),

    /// The assignment policy needs more trucks than the fleet provides.
    #[error("fleet of {required} trucks required, got {actual}")]
    FleetTooSmall {
        /// Trucks the policy requires.
        required: usize,
        /// Trucks actually configured.
        actual: usize,
    },

    /// A note locks a package to a truck that is not in the fleet.
    #[error("package {package} locked to unknown truck {truck}")]
    UnknownTruck {
        /// The truck id the note names.
        truck: u8,
        /// The locked package.
        package: u32,
    },

    /// Routing halted: no known distance from the truck's position to any
    /// remaining destination. The undelivered manifest is reported so the
    /// data fault can be located.
    #[error("truck {truck} routing incomplete at {from}: no distance to package {package} ({undelivered} undelivered)")]
    RoutingIncomplete {
        /// Truck whose run halted.
        truck: u8,
        /// Package whose destination was unreachable.
        package: u32,
        /// Canonical key of the truck's position when routing halted.
        from: String,
        /// Number of packages still onboard.
        undelivered: usize,
    },
}
