//! # parcel-dispatch
//!
//! Package delivery routing and simulation. Assigns a day's packages to a
//! small truck fleet under hard constraints, routes each truck with a
//! greedy nearest-neighbor heuristic while simulating its clock and
//! odometer, and answers point-in-time status queries against the
//! recorded timestamps.
//!
//! ## Modules
//!
//! - [`models`] — Domain model types (Package, Deadline, PackageStore, Truck)
//! - [`distance`] — Address canonicalization and symmetric distance lookup
//! - [`assignment`] — Constraint buckets and the fleet split policy
//! - [`routing`] — Nearest-neighbor routing simulation
//! - [`status`] — Point-in-time status derivation and query snapshots
//! - [`ingest`] — CSV ingestion of package and distance tables
//! - [`dispatch`] — The assembled system: run the day, query the results
//! - [`error`] — Ingestion and dispatch fault taxonomy

pub mod assignment;
pub mod dispatch;
pub mod distance;
pub mod error;
pub mod ingest;
pub mod models;
pub mod routing;
pub mod status;
