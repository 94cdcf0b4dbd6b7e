//! Package entity and delivery lifecycle types.

use chrono::NaiveTime;
use serde::Serialize;

/// A delivery deadline: either a wall-clock cutoff or end-of-day.
///
/// # Examples
///
/// ```
/// use parcel_dispatch::models::Deadline;
///
/// let d = Deadline::parse("10:30 AM").unwrap();
/// assert!(d.is_bounded());
/// assert_eq!(Deadline::parse("EOD"), Some(Deadline::EndOfDay));
/// assert_eq!(Deadline::parse("half past noon"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Deadline {
    /// No fixed cutoff; deliver any time before close of business.
    EndOfDay,
    /// Must arrive by the given wall-clock time.
    By(NaiveTime),
}

impl Deadline {
    /// Parses a deadline cell: the `"EOD"` sentinel or an `H:MM AM/PM` time.
    ///
    /// Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("EOD") {
            return Some(Self::EndOfDay);
        }
        NaiveTime::parse_from_str(s, "%I:%M %p").ok().map(Self::By)
    }

    /// Returns `true` for a fixed wall-clock cutoff.
    pub fn is_bounded(&self) -> bool {
        matches!(self, Self::By(_))
    }
}

impl std::fmt::Display for Deadline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndOfDay => write!(f, "EOD"),
            Self::By(t) => write!(f, "{}", t.format("%-I:%M %p")),
        }
    }
}

/// Lifecycle status of a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeliveryStatus {
    /// Waiting at the depot, not yet loaded.
    AtHub,
    /// Loaded on a truck that has departed.
    EnRoute,
    /// Delivered to its destination.
    Delivered,
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AtHub => write!(f, "at hub"),
            Self::EnRoute => write!(f, "en route"),
            Self::Delivered => write!(f, "delivered"),
        }
    }
}

/// A handling constraint parsed from the free-text notes column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Must ride the named truck.
    TruckOnly(u8),
    /// Not at the depot until the given time; `None` when the note gives no
    /// time (the assignment policy substitutes its late-start clock).
    DelayedUntil(Option<NaiveTime>),
    /// Must travel on the same truck as the listed package ids.
    DeliverWith(Vec<u32>),
}

/// A one-time address change effective at a fixed cutover time.
///
/// Address-only: the router never consults it, so delivery timing is
/// unaffected. Status queries at or after `effective_at` report the
/// corrected fields; earlier queries report the original address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCorrection {
    /// Cutover time at which the correction takes effect.
    pub effective_at: NaiveTime,
    /// Corrected street address.
    pub street: String,
    /// Corrected city.
    pub city: String,
    /// Corrected state.
    pub state: String,
    /// Corrected postal code.
    pub zip: String,
}

/// A delivery package.
///
/// Identity fields are fixed at construction; lifecycle fields mutate only
/// through [`Package::mark_loaded`] and [`Package::mark_delivered`], which
/// stamp the departure and delivery timestamps exactly once.
///
/// # Examples
///
/// ```
/// use parcel_dispatch::models::{Deadline, DeliveryStatus, Package};
///
/// let p = Package::new(1, "195 W Oakland Ave", "Salt Lake City", "UT", "84115")
///     .with_deadline(Deadline::parse("10:30 AM").unwrap())
///     .with_weight(21.0);
/// assert_eq!(p.id(), 1);
/// assert_eq!(p.status(), DeliveryStatus::AtHub);
/// assert!(p.departure_time().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Package {
    id: u32,
    street: String,
    city: String,
    state: String,
    zip: String,
    deadline: Deadline,
    weight: f64,
    notes: String,
    constraints: Vec<Constraint>,
    correction: Option<AddressCorrection>,
    status: DeliveryStatus,
    departure_time: Option<NaiveTime>,
    delivery_time: Option<NaiveTime>,
    truck: Option<u8>,
}

impl Package {
    /// Creates a package with the given identity.
    ///
    /// Default: end-of-day deadline, zero weight, no notes or constraints.
    pub fn new(
        id: u32,
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        Self {
            id,
            street: street.into(),
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
            deadline: Deadline::EndOfDay,
            weight: 0.0,
            notes: String::new(),
            constraints: Vec::new(),
            correction: None,
            status: DeliveryStatus::AtHub,
            departure_time: None,
            delivery_time: None,
            truck: None,
        }
    }

    /// Sets the delivery deadline.
    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    /// Sets the weight in kilograms.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the raw notes text.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Sets the parsed note constraints.
    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Self {
        self.constraints = constraints;
        self
    }

    /// Package identifier.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Street address as ingested.
    pub fn street(&self) -> &str {
        &self.street
    }

    /// City.
    pub fn city(&self) -> &str {
        &self.city
    }

    /// State.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Postal code.
    pub fn zip(&self) -> &str {
        &self.zip
    }

    /// Delivery deadline.
    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    /// Weight in kilograms.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Raw notes text.
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Parsed note constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The truck this package must ride, if locked.
    pub fn truck_lock(&self) -> Option<u8> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::TruckOnly(t) => Some(*t),
            _ => None,
        })
    }

    /// Returns `true` if the package is not available at depot departure.
    pub fn is_delayed(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, Constraint::DelayedUntil(_)))
    }

    /// The time a delayed package reaches the depot, when the note gave one.
    pub fn available_from(&self) -> Option<NaiveTime> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::DelayedUntil(t) => *t,
            _ => None,
        })
    }

    /// Ids of packages that must ride the same truck as this one.
    pub fn linked_ids(&self) -> &[u32] {
        self.constraints
            .iter()
            .find_map(|c| match c {
                Constraint::DeliverWith(ids) => Some(ids.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Current lifecycle status.
    pub fn status(&self) -> DeliveryStatus {
        self.status
    }

    /// Departure timestamp, stamped at load time.
    pub fn departure_time(&self) -> Option<NaiveTime> {
        self.departure_time
    }

    /// Delivery timestamp, stamped when a truck completes the delivery.
    pub fn delivery_time(&self) -> Option<NaiveTime> {
        self.delivery_time
    }

    /// Id of the truck the package was loaded on.
    pub fn truck(&self) -> Option<u8> {
        self.truck
    }

    /// Scheduled address correction, if any.
    pub fn correction(&self) -> Option<&AddressCorrection> {
        self.correction.as_ref()
    }

    /// Installs a scheduled address correction.
    pub fn schedule_correction(&mut self, correction: AddressCorrection) {
        self.correction = Some(correction);
    }

    /// Transitions to en-route, stamping the departure time once.
    pub fn mark_loaded(&mut self, truck: u8, at: NaiveTime) {
        if self.departure_time.is_none() {
            self.departure_time = Some(at);
        }
        self.truck = Some(truck);
        self.status = DeliveryStatus::EnRoute;
    }

    /// Transitions to delivered, stamping the delivery time once.
    pub fn mark_delivered(&mut self, at: NaiveTime) {
        debug_assert!(
            self.departure_time.map(|d| at >= d).unwrap_or(false),
            "delivery must not precede departure"
        );
        if self.delivery_time.is_none() {
            self.delivery_time = Some(at);
        }
        self.status = DeliveryStatus::Delivered;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%I:%M %p").expect("valid time")
    }

    #[test]
    fn test_deadline_parse() {
        assert_eq!(Deadline::parse("EOD"), Some(Deadline::EndOfDay));
        assert_eq!(Deadline::parse("eod"), Some(Deadline::EndOfDay));
        assert_eq!(Deadline::parse("10:30 AM"), Some(Deadline::By(t("10:30 AM"))));
        assert_eq!(Deadline::parse("not a time"), None);
    }

    #[test]
    fn test_deadline_display() {
        assert_eq!(Deadline::EndOfDay.to_string(), "EOD");
        assert_eq!(Deadline::By(t("9:00 AM")).to_string(), "9:00 AM");
    }

    #[test]
    fn test_package_defaults() {
        let p = Package::new(3, "233 Canyon Rd", "Salt Lake City", "UT", "84103");
        assert_eq!(p.deadline(), Deadline::EndOfDay);
        assert_eq!(p.status(), DeliveryStatus::AtHub);
        assert!(p.departure_time().is_none());
        assert!(p.delivery_time().is_none());
        assert!(p.truck().is_none());
        assert!(p.truck_lock().is_none());
        assert!(!p.is_delayed());
        assert!(p.linked_ids().is_empty());
    }

    #[test]
    fn test_constraint_lookups() {
        let p = Package::new(36, "2300 Parkway Blvd", "West Valley City", "UT", "84119")
            .with_constraints(vec![Constraint::TruckOnly(2)]);
        assert_eq!(p.truck_lock(), Some(2));

        let q = Package::new(25, "5383 S 900 East #104", "Salt Lake City", "UT", "84117")
            .with_constraints(vec![Constraint::DelayedUntil(Some(t("9:05 AM")))]);
        assert!(q.is_delayed());
        assert_eq!(q.available_from(), Some(t("9:05 AM")));

        let r = Package::new(14, "4300 S 1300 E", "Millcreek", "UT", "84117")
            .with_constraints(vec![Constraint::DeliverWith(vec![15, 19])]);
        assert_eq!(r.linked_ids(), &[15, 19]);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut p = Package::new(1, "195 W Oakland Ave", "Salt Lake City", "UT", "84115");
        p.mark_loaded(1, t("8:00 AM"));
        assert_eq!(p.status(), DeliveryStatus::EnRoute);
        assert_eq!(p.departure_time(), Some(t("8:00 AM")));
        assert_eq!(p.truck(), Some(1));

        p.mark_delivered(t("8:20 AM"));
        assert_eq!(p.status(), DeliveryStatus::Delivered);
        assert_eq!(p.delivery_time(), Some(t("8:20 AM")));
    }

    #[test]
    fn test_timestamps_stamp_once() {
        let mut p = Package::new(1, "195 W Oakland Ave", "Salt Lake City", "UT", "84115");
        p.mark_loaded(1, t("8:00 AM"));
        p.mark_loaded(1, t("9:00 AM"));
        assert_eq!(p.departure_time(), Some(t("8:00 AM")));

        p.mark_delivered(t("8:20 AM"));
        p.mark_delivered(t("9:40 AM"));
        assert_eq!(p.delivery_time(), Some(t("8:20 AM")));
    }

    #[test]
    fn test_correction_install() {
        let mut p = Package::new(9, "300 State St", "Salt Lake City", "UT", "84103");
        assert!(p.correction().is_none());
        p.schedule_correction(AddressCorrection {
            effective_at: t("10:20 AM"),
            street: "410 S State St".to_string(),
            city: "Salt Lake City".to_string(),
            state: "UT".to_string(),
            zip: "84111".to_string(),
        });
        assert_eq!(p.correction().expect("installed").zip, "84111");
    }
}
