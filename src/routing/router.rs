//! Greedy nearest-neighbor route driver.

use chrono::NaiveTime;
use log::{debug, info};

use crate::distance::LocationIndex;
use crate::error::DispatchError;
use crate::models::{PackageStore, Truck};

/// Outcome of one truck's completed routing run.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    truck: u8,
    delivered: usize,
    miles: f64,
    finished_at: NaiveTime,
}

impl RouteSummary {
    /// Truck that ran the route.
    pub fn truck(&self) -> u8 {
        self.truck
    }

    /// Number of packages delivered.
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Miles driven during this run.
    pub fn miles(&self) -> f64 {
        self.miles
    }

    /// Truck clock when the last package was handed off.
    pub fn finished_at(&self) -> NaiveTime {
        self.finished_at
    }
}

/// Loads the manifest onto the truck and delivers it to exhaustion.
///
/// Every iteration selects the onboard package whose destination is
/// nearest the truck's current location (ties broken by lowest package
/// id), advances the clock by `distance / speed`, accumulates the
/// odometer, and stamps the delivery. The loop strictly shrinks the
/// manifest, so it always terminates.
///
/// An unreachable destination (no known distance after normalization and
/// alias lookup) is a data-quality fault: the run halts with
/// [`DispatchError::RoutingIncomplete`] instead of looping or skipping
/// the package.
pub fn route_truck(
    truck: &mut Truck,
    manifest: &[u32],
    store: &mut PackageStore,
    index: &LocationIndex,
) -> Result<RouteSummary, DispatchError> {
    for &id in manifest {
        truck.load(id)?;
        store
            .get_mut(id)
            .ok_or(DispatchError::UnknownPackage(id))?
            .mark_loaded(truck.id(), truck.clock());
    }
    info!(
        "truck {} departing at {} with {} packages",
        truck.id(),
        truck.clock().format("%-I:%M %p"),
        manifest.len()
    );

    let start_miles = truck.mileage();
    loop {
        let Some((next, distance)) = nearest_onboard(truck, store, index) else {
            break;
        };
        if !distance.is_finite() {
            return Err(DispatchError::RoutingIncomplete {
                truck: truck.id(),
                package: next,
                from: truck.location().to_string(),
                undelivered: truck.manifest().len(),
            });
        }
        let destination = match store.get(next) {
            Some(package) => index.resolve_key(package.street()),
            None => return Err(DispatchError::UnknownPackage(next)),
        };
        debug!(
            "truck {}: next package {} at {destination} ({distance:.1} mi)",
            truck.id(),
            next
        );
        let at = truck.deliver(next, distance, &destination);
        store
            .get_mut(next)
            .ok_or(DispatchError::UnknownPackage(next))?
            .mark_delivered(at);
    }

    let summary = RouteSummary {
        truck: truck.id(),
        delivered: manifest.len(),
        miles: truck.mileage() - start_miles,
        finished_at: truck.clock(),
    };
    info!(
        "truck {} finished at {} after {:.1} mi",
        summary.truck,
        summary.finished_at.format("%-I:%M %p"),
        summary.miles
    );
    Ok(summary)
}

/// The onboard package nearest the truck's position, lowest id winning
/// ties. `None` when the manifest is empty.
fn nearest_onboard(
    truck: &Truck,
    store: &PackageStore,
    index: &LocationIndex,
) -> Option<(u32, f64)> {
    let mut best: Option<(u32, f64)> = None;
    for &id in truck.manifest() {
        let street = store.get(id).expect("manifest ids verified at load").street();
        let d = index.distance(truck.location(), street);
        best = match best {
            None => Some((id, d)),
            Some((bid, bd)) if d < bd || (d == bd && id < bid) => Some((id, d)),
            keep => keep,
        };
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Package;

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%I:%M %p").expect("valid time")
    }

    fn line_world() -> (PackageStore, LocationIndex) {
        // Three stops on a line east of the hub.
        let mut index = LocationIndex::new();
        index.insert("HUB", "100 East Street", 1.0);
        index.insert("HUB", "200 East Street", 2.0);
        index.insert("HUB", "300 East Street", 3.0);
        index.insert("100 East Street", "200 East Street", 1.0);
        index.insert("100 East Street", "300 East Street", 2.0);
        index.insert("200 East Street", "300 East Street", 1.0);

        let mut store = PackageStore::new();
        store.insert(Package::new(1, "100 East Street", "Salt Lake City", "UT", "84101"));
        store.insert(Package::new(2, "200 East Street", "Salt Lake City", "UT", "84101"));
        store.insert(Package::new(3, "300 East Street", "Salt Lake City", "UT", "84101"));
        (store, index)
    }

    #[test]
    fn test_delivers_nearest_first() {
        let (mut store, index) = line_world();
        let mut truck = Truck::new(1);
        let summary = route_truck(&mut truck, &[3, 1, 2], &mut store, &index).expect("routes");

        assert_eq!(summary.delivered(), 3);
        assert!(truck.manifest().is_empty());
        // Greedy order is 1, 2, 3 regardless of manifest order.
        let d1 = store.get(1).expect("present").delivery_time().expect("delivered");
        let d2 = store.get(2).expect("present").delivery_time().expect("delivered");
        let d3 = store.get(3).expect("present").delivery_time().expect("delivered");
        assert!(d1 < d2 && d2 < d3);
        // 1 + 1 + 1 miles.
        assert!((summary.miles() - 3.0).abs() < 1e-10);
        assert!((truck.mileage() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_clock_advances_by_distance_over_speed() {
        let (mut store, index) = line_world();
        // 18 mph: one mile per 200 seconds.
        let mut truck = Truck::new(1);
        route_truck(&mut truck, &[1], &mut store, &index).expect("routes");
        let delivered = store.get(1).expect("present").delivery_time().expect("delivered");
        assert_eq!(delivered, t("8:03 AM") + chrono::Duration::seconds(20));
    }

    #[test]
    fn test_tie_breaks_by_lowest_id() {
        let mut index = LocationIndex::new();
        index.insert("HUB", "500 North Street", 2.0);
        let mut store = PackageStore::new();
        // Two packages to the same address, equal distance.
        store.insert(Package::new(8, "500 North Street", "Salt Lake City", "UT", "84101"));
        store.insert(Package::new(4, "500 North Street", "Salt Lake City", "UT", "84101"));

        let mut truck = Truck::new(1);
        route_truck(&mut truck, &[8, 4], &mut store, &index).expect("routes");
        let d4 = store.get(4).expect("present").delivery_time().expect("delivered");
        let d8 = store.get(8).expect("present").delivery_time().expect("delivered");
        assert!(d4 <= d8);
    }

    #[test]
    fn test_each_package_delivered_exactly_once() {
        let (mut store, index) = line_world();
        let mut truck = Truck::new(2);
        let summary = route_truck(&mut truck, &[1, 2, 3], &mut store, &index).expect("routes");
        assert_eq!(summary.delivered(), 3);
        for id in [1, 2, 3] {
            assert!(store.get(id).expect("present").delivery_time().is_some());
        }
    }

    #[test]
    fn test_unreachable_destination_halts() {
        let (mut store, index) = line_world();
        store.insert(Package::new(9, "1 Nowhere Lane", "Salt Lake City", "UT", "84101"));

        let mut truck = Truck::new(1);
        let err = route_truck(&mut truck, &[1, 9], &mut store, &index).expect_err("halts");
        match err {
            DispatchError::RoutingIncomplete {
                truck: 1,
                package,
                undelivered,
                ..
            } => {
                assert_eq!(package, 9);
                assert_eq!(undelivered, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        // The reachable package was still delivered before the halt.
        assert!(store.get(1).expect("present").delivery_time().is_some());
    }

    #[test]
    fn test_empty_manifest_is_a_noop() {
        let (mut store, index) = line_world();
        let mut truck = Truck::new(3).with_start_time(t("9:05 AM"));
        let summary = route_truck(&mut truck, &[], &mut store, &index).expect("routes");
        assert_eq!(summary.delivered(), 0);
        assert_eq!(summary.miles(), 0.0);
        assert_eq!(summary.finished_at(), t("9:05 AM"));
    }
}
