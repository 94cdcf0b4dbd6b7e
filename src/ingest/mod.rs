//! Data ingestion: delimited package and distance records.
//!
//! The core never reads files itself; these readers produce a populated
//! [`PackageStore`](crate::models::PackageStore) and
//! [`LocationIndex`](crate::distance::LocationIndex) or fail the whole
//! load — no partial system runs on incomplete data.

mod distances;
mod packages;

pub use distances::{load_distances, read_distances};
pub use packages::{load_packages, parse_constraints, read_packages};
