//! Point-in-time status derivation and query snapshots.
//!
//! Pure functions over the recorded departure/delivery timestamps: nothing
//! here mutates a package, so queries can run repeatedly at arbitrary
//! times against the now-immutable results of the routing simulation.

use chrono::NaiveTime;
use serde::Serialize;

use crate::models::{Deadline, DeliveryStatus, Package};

/// The address fields of a package as effective at some query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressView<'a> {
    /// Street address.
    pub street: &'a str,
    /// City.
    pub city: &'a str,
    /// State.
    pub state: &'a str,
    /// Postal code.
    pub zip: &'a str,
}

/// A serializable point-in-time view of one package.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageSnapshot {
    /// Package identifier.
    pub id: u32,
    /// Street address effective at the query time.
    pub address: String,
    /// City effective at the query time.
    pub city: String,
    /// Postal code effective at the query time.
    pub zip: String,
    /// Delivery deadline.
    pub deadline: Deadline,
    /// Weight in kilograms.
    pub weight: f64,
    /// Lifecycle status at the query time.
    pub status: DeliveryStatus,
    /// Delivery timestamp, when delivered.
    pub delivery_time: Option<NaiveTime>,
    /// Truck the package was assigned to, once loaded.
    pub truck: Option<u8>,
}

/// Derives a package's lifecycle state at a query time.
///
/// With no query time, returns the stored (current) status. Otherwise:
/// at-hub before the departure timestamp (or while departure is unset),
/// en-route from departure until delivery, delivered from the delivery
/// timestamp on.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use parcel_dispatch::models::{DeliveryStatus, Package};
/// use parcel_dispatch::status::status_at;
///
/// let t = |s| NaiveTime::parse_from_str(s, "%H:%M").unwrap();
/// let mut p = Package::new(1, "195 W Oakland Ave", "Salt Lake City", "UT", "84115");
/// p.mark_loaded(1, t("09:05"));
/// p.mark_delivered(t("10:30"));
///
/// assert_eq!(status_at(&p, Some(t("09:04"))), DeliveryStatus::AtHub);
/// assert_eq!(status_at(&p, Some(t("09:05"))), DeliveryStatus::EnRoute);
/// assert_eq!(status_at(&p, Some(t("10:30"))), DeliveryStatus::Delivered);
/// ```
pub fn status_at(package: &Package, at: Option<NaiveTime>) -> DeliveryStatus {
    let Some(at) = at else {
        return package.status();
    };
    match package.departure_time() {
        None => DeliveryStatus::AtHub,
        Some(departure) if at < departure => DeliveryStatus::AtHub,
        Some(_) => match package.delivery_time() {
            Some(delivery) if at >= delivery => DeliveryStatus::Delivered,
            _ => DeliveryStatus::EnRoute,
        },
    }
}

/// The address a package should be reported at for a query time.
///
/// A scheduled correction takes effect at its cutover time and is
/// independent of delivery state; queries before the cutover see the
/// original address. With no query time the correction, if any, is
/// treated as already effective.
pub fn address_at(package: &Package, at: Option<NaiveTime>) -> AddressView<'_> {
    match package.correction() {
        Some(c) if at.map_or(true, |t| t >= c.effective_at) => AddressView {
            street: &c.street,
            city: &c.city,
            state: &c.state,
            zip: &c.zip,
        },
        _ => AddressView {
            street: package.street(),
            city: package.city(),
            state: package.state(),
            zip: package.zip(),
        },
    }
}

/// Assembles the point-in-time snapshot handed to presentation code.
pub fn snapshot(package: &Package, at: Option<NaiveTime>) -> PackageSnapshot {
    let address = address_at(package, at);
    PackageSnapshot {
        id: package.id(),
        address: address.street.to_string(),
        city: address.city.to_string(),
        zip: address.zip.to_string(),
        deadline: package.deadline(),
        weight: package.weight(),
        status: status_at(package, at),
        delivery_time: package.delivery_time(),
        truck: package.truck(),
    }
}
