//! The dispatch context object.
//!
//! Owns the package store, the location index, and the truck fleet, and
//! sequences the day: assignment, per-truck routing, then point-in-time
//! queries against the recorded timestamps. Constructed explicitly and
//! passed around; there is no ambient global state.

use std::collections::BTreeMap;

use chrono::NaiveTime;
use log::info;

use crate::assignment::AssignmentPolicy;
use crate::distance::LocationIndex;
use crate::error::DispatchError;
use crate::models::{AddressCorrection, PackageStore, Truck};
use crate::routing::{route_truck, RouteSummary};
use crate::status::{snapshot, PackageSnapshot};

/// A fully-assembled delivery system for one simulated day.
///
/// # Examples
///
/// ```
/// use parcel_dispatch::dispatch::DispatchSystem;
/// use parcel_dispatch::distance::LocationIndex;
/// use parcel_dispatch::models::{Package, PackageStore};
///
/// let mut store = PackageStore::new();
/// store.insert(Package::new(1, "195 W Oakland Ave", "Salt Lake City", "UT", "84115"));
/// let mut index = LocationIndex::new();
/// index.insert("HUB", "195 W Oakland Ave", 3.5);
///
/// let mut system = DispatchSystem::new(store, index);
/// system.run(&[]).unwrap();
/// assert!(system.total_mileage() > 0.0);
/// ```
#[derive(Debug)]
pub struct DispatchSystem {
    store: PackageStore,
    index: LocationIndex,
    trucks: Vec<Truck>,
    policy: AssignmentPolicy,
    summaries: Vec<RouteSummary>,
}

impl DispatchSystem {
    /// Builds a system over the given data with the default three-truck
    /// fleet and default policy.
    pub fn new(store: PackageStore, index: LocationIndex) -> Self {
        Self {
            store,
            index,
            trucks: vec![Truck::new(1), Truck::new(2), Truck::new(3)],
            policy: AssignmentPolicy::new(),
            summaries: Vec::new(),
        }
    }

    /// Replaces the fleet.
    pub fn with_fleet(mut self, trucks: Vec<Truck>) -> Self {
        self.trucks = trucks;
        self
    }

    /// Replaces the assignment policy.
    pub fn with_policy(mut self, policy: AssignmentPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The package store.
    pub fn store(&self) -> &PackageStore {
        &self.store
    }

    /// The location index.
    pub fn index(&self) -> &LocationIndex {
        &self.index
    }

    /// The truck fleet.
    pub fn trucks(&self) -> &[Truck] {
        &self.trucks
    }

    /// Summaries of completed routing runs.
    pub fn summaries(&self) -> &[RouteSummary] {
        &self.summaries
    }

    /// Installs a scheduled mid-route address correction.
    pub fn schedule_correction(
        &mut self,
        package_id: u32,
        correction: AddressCorrection,
    ) -> Result<(), DispatchError> {
        self.store
            .get_mut(package_id)
            .ok_or(DispatchError::UnknownPackage(package_id))?
            .schedule_correction(correction);
        Ok(())
    }

    /// Assigns every package and routes each truck to completion.
    ///
    /// Trucks route sequentially, each fully owning its run; the late
    /// truck's clock is pushed to the policy's late start first. Fails on
    /// capacity or reachability faults without dropping packages.
    pub fn run(&mut self, extra_groups: &[Vec<u32>]) -> Result<&[RouteSummary], DispatchError> {
        let assignment = self.policy.assign(&self.store, extra_groups, &self.trucks)?;
        info!("assignment complete, routing {} trucks", self.trucks.len());

        for truck in &mut self.trucks {
            if truck.id() == assignment.late_truck() {
                truck.set_start_time(assignment.late_start());
            }
            let manifest = assignment.manifest(truck.id()).to_vec();
            let summary = route_truck(truck, &manifest, &mut self.store, &self.index)?;
            self.summaries.push(summary);
        }
        Ok(&self.summaries)
    }

    /// Point-in-time snapshot of one package; `None` for an unknown id.
    ///
    /// Without a query time the snapshot reflects the stored (current)
    /// state.
    pub fn status(&self, package_id: u32, at: Option<NaiveTime>) -> Option<PackageSnapshot> {
        self.store.get(package_id).map(|p| snapshot(p, at))
    }

    /// Snapshots of every package at the query time, ordered by id.
    pub fn statuses(&self, at: Option<NaiveTime>) -> Vec<PackageSnapshot> {
        self.store.all().map(|p| snapshot(p, at)).collect()
    }

    /// Total fleet mileage.
    pub fn total_mileage(&self) -> f64 {
        self.trucks.iter().map(Truck::mileage).sum()
    }

    /// Mileage per truck id.
    pub fn mileage_by_truck(&self) -> BTreeMap<u8, f64> {
        self.trucks.iter().map(|t| (t.id(), t.mileage())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Constraint, Deadline, DeliveryStatus, Package};

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%I:%M %p").expect("valid time")
    }

    fn small_world() -> DispatchSystem {
        let mut index = LocationIndex::new();
        let stops = ["100 East Street", "200 East Street", "300 East Street"];
        index.insert("HUB", stops[0], 1.0);
        index.insert("HUB", stops[1], 2.0);
        index.insert("HUB", stops[2], 3.0);
        index.insert(stops[0], stops[1], 1.0);
        index.insert(stops[0], stops[2], 2.0);
        index.insert(stops[1], stops[2], 1.0);

        let mut store = PackageStore::new();
        store.insert(
            Package::new(1, stops[0], "Salt Lake City", "UT", "84101")
                .with_deadline(Deadline::By(t("10:30 AM"))),
        );
        store.insert(
            Package::new(2, stops[1], "Salt Lake City", "UT", "84101")
                .with_constraints(vec![Constraint::TruckOnly(2)]),
        );
        store.insert(
            Package::new(3, stops[2], "Salt Lake City", "UT", "84101")
                .with_constraints(vec![Constraint::DelayedUntil(Some(t("9:05 AM")))]),
        );
        store.insert(Package::new(4, stops[0], "Salt Lake City", "UT", "84101"));

        DispatchSystem::new(store, index)
    }

    #[test]
    fn test_run_delivers_everything() {
        let mut system = small_world();
        let summaries = system.run(&[]).expect("runs").to_vec();
        assert_eq!(summaries.len(), 3);
        for p in system.store().all() {
            assert_eq!(p.status(), DeliveryStatus::Delivered);
            assert!(p.delivery_time().is_some());
        }
    }

    #[test]
    fn test_mileage_conservation() {
        let mut system = small_world();
        system.run(&[]).expect("runs");
        let by_truck = system.mileage_by_truck();
        let sum: f64 = by_truck.values().sum();
        assert!((system.total_mileage() - sum).abs() < 1e-10);
        let from_summaries: f64 = system.summaries().iter().map(RouteSummary::miles).sum();
        assert!((system.total_mileage() - from_summaries).abs() < 1e-10);
    }

    #[test]
    fn test_locked_package_rides_truck_two() {
        let mut system = small_world();
        system.run(&[]).expect("runs");
        assert_eq!(system.store().get(2).expect("present").truck(), Some(2));
    }

    #[test]
    fn test_late_truck_departs_late() {
        let mut system = small_world();
        system.run(&[]).expect("runs");
        let delayed = system.store().get(3).expect("present");
        assert_eq!(delayed.truck(), Some(3));
        assert_eq!(delayed.departure_time(), Some(t("9:05 AM")));
    }

    #[test]
    fn test_status_queries() {
        let mut system = small_world();
        system.run(&[]).expect("runs");

        assert!(system.status(99, None).is_none());
        let snap = system.status(1, Some(t("7:00 AM"))).expect("known id");
        assert_eq!(snap.status, DeliveryStatus::AtHub);

        let all = system.statuses(Some(t("11:00 PM")));
        assert_eq!(all.len(), 4);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));
        assert!(all.iter().all(|s| s.status == DeliveryStatus::Delivered));
    }

    #[test]
    fn test_schedule_correction_unknown_id() {
        let mut system = small_world();
        let err = system
            .schedule_correction(
                42,
                AddressCorrection {
                    effective_at: t("10:20 AM"),
                    street: "410 S State St".to_string(),
                    city: "Salt Lake City".to_string(),
                    state: "UT".to_string(),
                    zip: "84111".to_string(),
                },
            )
            .expect_err("unknown id");
        assert!(matches!(err, DispatchError::UnknownPackage(42)));
    }
}
