//! Domain model types for package delivery.
//!
//! Provides the core entities: packages with deadlines, parsed note
//! constraints, and delivery lifecycle state; the keyed package store; and
//! trucks carrying the mutable simulation state (clock, odometer, manifest).

mod package;
mod store;
mod truck;

pub use package::{AddressCorrection, Constraint, Deadline, DeliveryStatus, Package};
pub use store::PackageStore;
pub use truck::Truck;
