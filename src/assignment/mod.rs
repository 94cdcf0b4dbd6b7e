//! Fleet assignment: constraint buckets and the split policy.
//!
//! Classifies packages into constraint buckets (truck-locked, delayed,
//! deadline-bound, unconstrained), expands linked groups, and distributes
//! everything across the three-truck fleet before routing begins.

mod policy;

pub use policy::{Assignment, AssignmentPolicy, Buckets};
