//! Truck type carrying the per-vehicle simulation state.

use chrono::{Duration, NaiveTime};
use log::debug;

use crate::distance::HUB;
use crate::error::DispatchError;

/// Default manifest capacity.
const DEFAULT_CAPACITY: usize = 16;
/// Default average speed in miles per hour.
const DEFAULT_SPEED_MPH: f64 = 18.0;

/// A delivery truck.
///
/// Owns the mutable simulation state: the simulated clock, the odometer,
/// the current location key, and the manifest of onboard package ids.
/// The clock and odometer only advance; the manifest never exceeds
/// capacity.
///
/// # Examples
///
/// ```
/// use parcel_dispatch::models::Truck;
///
/// let truck = Truck::new(1);
/// assert_eq!(truck.id(), 1);
/// assert_eq!(truck.capacity(), 16);
/// assert_eq!(truck.location(), "HUB");
/// assert_eq!(truck.mileage(), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Truck {
    id: u8,
    capacity: usize,
    speed_mph: f64,
    clock: NaiveTime,
    location: String,
    mileage: f64,
    manifest: Vec<u32>,
}

impl Truck {
    /// Creates a truck with the given id.
    ///
    /// Default: capacity 16, 18 mph, 8:00 AM start, positioned at the hub.
    pub fn new(id: u8) -> Self {
        Self {
            id,
            capacity: DEFAULT_CAPACITY,
            speed_mph: DEFAULT_SPEED_MPH,
            clock: NaiveTime::from_hms_opt(8, 0, 0).expect("8:00 is a valid time"),
            location: HUB.to_string(),
            mileage: 0.0,
            manifest: Vec::new(),
        }
    }

    /// Sets the manifest capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the average speed in miles per hour.
    pub fn with_speed(mut self, mph: f64) -> Self {
        self.speed_mph = mph;
        self
    }

    /// Sets the depot-departure clock.
    pub fn with_start_time(mut self, start: NaiveTime) -> Self {
        self.clock = start;
        self
    }

    /// Truck id.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Manifest capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Average speed in miles per hour.
    pub fn speed_mph(&self) -> f64 {
        self.speed_mph
    }

    /// Current simulated clock.
    pub fn clock(&self) -> NaiveTime {
        self.clock
    }

    /// Canonical key of the current location.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Cumulative odometer miles.
    pub fn mileage(&self) -> f64 {
        self.mileage
    }

    /// Ids of packages currently onboard.
    pub fn manifest(&self) -> &[u32] {
        &self.manifest
    }

    /// Resets the departure clock before a run (used for the late wave).
    pub fn set_start_time(&mut self, start: NaiveTime) {
        self.clock = start;
    }

    /// Loads a package onto the manifest.
    ///
    /// Fails with [`DispatchError::CapacityExceeded`] when the manifest is
    /// full; the package is never silently dropped.
    pub fn load(&mut self, package_id: u32) -> Result<(), DispatchError> {
        if self.manifest.len() >= self.capacity {
            return Err(DispatchError::CapacityExceeded {
                truck: self.id,
                assigned: self.manifest.len() + 1,
                capacity: self.capacity,
            });
        }
        self.manifest.push(package_id);
        Ok(())
    }

    /// Drives to a destination and hands off one package.
    ///
    /// Advances the clock by `distance / speed` hours, accumulates the
    /// odometer, removes the package from the manifest, and moves to the
    /// destination key. Returns the clock at handoff.
    pub fn deliver(&mut self, package_id: u32, distance: f64, destination: &str) -> NaiveTime {
        debug_assert!(distance.is_finite() && distance >= 0.0);
        self.clock = self.clock + travel_time(distance, self.speed_mph);
        self.mileage += distance;
        self.manifest.retain(|&id| id != package_id);
        self.location = destination.to_string();
        debug!(
            "truck {} delivered package {} at {} ({:.1} mi total)",
            self.id,
            package_id,
            self.clock.format("%-I:%M %p"),
            self.mileage
        );
        self.clock
    }
}

/// Travel time for a distance at the given speed, rounded to whole seconds.
fn travel_time(distance: f64, speed_mph: f64) -> Duration {
    Duration::seconds((distance / speed_mph * 3600.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%I:%M %p").expect("valid time")
    }

    #[test]
    fn test_truck_defaults() {
        let truck = Truck::new(2);
        assert_eq!(truck.id(), 2);
        assert_eq!(truck.capacity(), 16);
        assert_eq!(truck.speed_mph(), 18.0);
        assert_eq!(truck.clock(), t("8:00 AM"));
        assert_eq!(truck.location(), HUB);
        assert!(truck.manifest().is_empty());
    }

    #[test]
    fn test_truck_builder() {
        let truck = Truck::new(3)
            .with_capacity(12)
            .with_speed(25.0)
            .with_start_time(t("9:05 AM"));
        assert_eq!(truck.capacity(), 12);
        assert_eq!(truck.speed_mph(), 25.0);
        assert_eq!(truck.clock(), t("9:05 AM"));
    }

    #[test]
    fn test_load_respects_capacity() {
        let mut truck = Truck::new(1).with_capacity(2);
        truck.load(10).expect("fits");
        truck.load(11).expect("fits");
        let err = truck.load(12).expect_err("over capacity");
        assert!(matches!(
            err,
            DispatchError::CapacityExceeded {
                truck: 1,
                capacity: 2,
                ..
            }
        ));
        assert_eq!(truck.manifest(), &[10, 11]);
    }

    #[test]
    fn test_deliver_advances_clock_and_odometer() {
        // 18 miles at 18 mph is exactly one hour.
        let mut truck = Truck::new(1);
        truck.load(4).expect("fits");
        let at = truck.deliver(4, 18.0, "380 W 2880 South");
        assert_eq!(at, t("9:00 AM"));
        assert_eq!(truck.clock(), t("9:00 AM"));
        assert_eq!(truck.mileage(), 18.0);
        assert_eq!(truck.location(), "380 W 2880 South");
        assert!(truck.manifest().is_empty());
    }

    #[test]
    fn test_clock_and_mileage_monotonic() {
        let mut truck = Truck::new(1);
        for id in [1, 2, 3] {
            truck.load(id).expect("fits");
        }
        let mut last_clock = truck.clock();
        let mut last_miles = truck.mileage();
        for (id, d) in [(2u32, 3.5), (1u32, 0.0), (3u32, 7.2)] {
            truck.deliver(id, d, "somewhere");
            assert!(truck.clock() >= last_clock);
            assert!(truck.mileage() >= last_miles);
            last_clock = truck.clock();
            last_miles = truck.mileage();
        }
    }

    #[test]
    fn test_travel_time_rounding() {
        // 4.5 miles at 18 mph = 15 minutes.
        assert_eq!(travel_time(4.5, 18.0), Duration::seconds(900));
        assert_eq!(travel_time(0.0, 18.0), Duration::seconds(0));
    }
}
