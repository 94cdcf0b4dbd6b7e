//! Classification-and-assignment policy.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveTime;
use log::info;

use crate::error::DispatchError;
use crate::models::{PackageStore, Truck};

/// Default cap on deadline-bound packages riding the first truck.
const DEFAULT_FIRST_WAVE_CAP: usize = 12;

/// Ephemeral constraint buckets produced by classification.
///
/// Each package lands in exactly one bucket, decided by its first matching
/// constraint: truck lock, then delayed availability, then a bounded
/// deadline, then unconstrained. All buckets are in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
    /// Must ride the truck their note names.
    pub locked: Vec<u32>,
    /// Not at the depot when the first wave departs.
    pub delayed: Vec<u32>,
    /// Carry a fixed wall-clock deadline.
    pub deadline: Vec<u32>,
    /// No constraint at all.
    pub unconstrained: Vec<u32>,
}

/// The result of assignment: one manifest per truck, plus the late start
/// applied to the third truck.
#[derive(Debug, Clone)]
pub struct Assignment {
    manifests: BTreeMap<u8, Vec<u32>>,
    late_truck: u8,
    late_start: NaiveTime,
}

impl Assignment {
    /// Manifest assigned to the given truck (empty for unknown ids).
    pub fn manifest(&self, truck: u8) -> &[u32] {
        self.manifests.get(&truck).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates `(truck id, manifest)` in truck order.
    pub fn manifests(&self) -> impl Iterator<Item = (u8, &[u32])> {
        self.manifests.iter().map(|(t, m)| (*t, m.as_slice()))
    }

    /// The truck whose clock is pushed to the late start.
    pub fn late_truck(&self) -> u8 {
        self.late_truck
    }

    /// Depot-departure time for the late truck.
    pub fn late_start(&self) -> NaiveTime {
        self.late_start
    }
}

/// The package-to-truck split policy.
///
/// Pure: reads the store and fleet, produces an [`Assignment`] without
/// touching either. Priority order: up to [`first_wave_cap`] deadline-bound
/// packages ride truck 1; deadline overflow and every locked package ride
/// truck 2, which then fills from the unconstrained bucket; delayed
/// packages and the remaining unconstrained ride truck 3 with a late
/// departure. Linked groups never split across trucks.
///
/// [`first_wave_cap`]: AssignmentPolicy::with_first_wave_cap
///
/// # Examples
///
/// ```
/// use parcel_dispatch::assignment::AssignmentPolicy;
///
/// let policy = AssignmentPolicy::new().with_first_wave_cap(12);
/// assert_eq!(policy.first_wave_cap(), 12);
/// ```
#[derive(Debug, Clone)]
pub struct AssignmentPolicy {
    first_wave_cap: usize,
    late_start: NaiveTime,
}

impl Default for AssignmentPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl AssignmentPolicy {
    /// Creates the default policy: first-wave cap 12, late start 9:05 AM.
    pub fn new() -> Self {
        Self {
            first_wave_cap: DEFAULT_FIRST_WAVE_CAP,
            late_start: NaiveTime::from_hms_opt(9, 5, 0).expect("9:05 is a valid time"),
        }
    }

    /// Sets the cap on deadline-bound packages assigned to truck 1.
    pub fn with_first_wave_cap(mut self, cap: usize) -> Self {
        self.first_wave_cap = cap;
        self
    }

    /// Sets the departure clock for the delayed third truck.
    pub fn with_late_start(mut self, start: NaiveTime) -> Self {
        self.late_start = start;
        self
    }

    /// Cap on deadline-bound packages riding truck 1.
    pub fn first_wave_cap(&self) -> usize {
        self.first_wave_cap
    }

    /// Departure clock for the delayed third truck.
    pub fn late_start(&self) -> NaiveTime {
        self.late_start
    }

    /// Partitions every stored package into its constraint bucket.
    pub fn classify(&self, store: &PackageStore) -> Buckets {
        let mut buckets = Buckets::default();
        for package in store.all() {
            if package.truck_lock().is_some() {
                buckets.locked.push(package.id());
            } else if package.is_delayed() {
                buckets.delayed.push(package.id());
            } else if package.deadline().is_bounded() {
                buckets.deadline.push(package.id());
            } else {
                buckets.unconstrained.push(package.id());
            }
        }
        buckets
    }

    /// Computes linked-group components from note constraints plus any
    /// explicitly supplied groups.
    ///
    /// Groups sharing a member are merged; every referenced id must exist
    /// in the store. Only components of two or more packages are returned,
    /// each sorted by id, ordered by their smallest member.
    pub fn linked_groups(
        store: &PackageStore,
        extra: &[Vec<u32>],
    ) -> Result<Vec<Vec<u32>>, DispatchError> {
        let mut adjacency: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
        let link = |a: u32, b: u32, adjacency: &mut BTreeMap<u32, BTreeSet<u32>>| {
            adjacency.entry(a).or_default().insert(b);
            adjacency.entry(b).or_default().insert(a);
        };

        for package in store.all() {
            for &peer in package.linked_ids() {
                if !store.contains(peer) {
                    return Err(DispatchError::UnknownPackage(peer));
                }
                link(package.id(), peer, &mut adjacency);
            }
        }
        for group in extra {
            for window in group.windows(2) {
                for &id in window {
                    if !store.contains(id) {
                        return Err(DispatchError::UnknownPackage(id));
                    }
                }
                link(window[0], window[1], &mut adjacency);
            }
        }

        let mut seen: BTreeSet<u32> = BTreeSet::new();
        let mut groups = Vec::new();
        for &start in adjacency.keys() {
            if seen.contains(&start) {
                continue;
            }
            let mut component = BTreeSet::new();
            let mut stack = vec![start];
            while let Some(id) = stack.pop() {
                if !component.insert(id) {
                    continue;
                }
                if let Some(peers) = adjacency.get(&id) {
                    stack.extend(peers.iter().copied());
                }
            }
            seen.extend(component.iter().copied());
            if component.len() > 1 {
                groups.push(component.into_iter().collect());
            }
        }
        Ok(groups)
    }

    /// Splits all packages across the fleet.
    ///
    /// Requires a fleet of at least three trucks; manifests respect hard
    /// capacity or the call fails with
    /// [`DispatchError::CapacityExceeded`] — a package is never dropped.
    pub fn assign(
        &self,
        store: &PackageStore,
        extra_groups: &[Vec<u32>],
        fleet: &[Truck],
    ) -> Result<Assignment, DispatchError> {
        if fleet.len() < 3 {
            return Err(DispatchError::FleetTooSmall {
                required: 3,
                actual: fleet.len(),
            });
        }
        let (first, second, third) = (fleet[0].id(), fleet[1].id(), fleet[2].id());

        let groups = Self::linked_groups(store, extra_groups)?;
        let group_of: HashMap<u32, usize> = groups
            .iter()
            .enumerate()
            .flat_map(|(gi, g)| g.iter().map(move |&id| (id, gi)))
            .collect();

        let buckets = self.classify(store);

        // Deadline-bound set, expanded with linked peers pulled out of the
        // unconstrained bucket.
        let mut deadline: BTreeSet<u32> = buckets.deadline.iter().copied().collect();
        let mut unconstrained = buckets.unconstrained.clone();
        for group in &groups {
            if group.iter().any(|id| deadline.contains(id)) {
                for &id in group {
                    if let Some(pos) = unconstrained.iter().position(|&u| u == id) {
                        unconstrained.remove(pos);
                        deadline.insert(id);
                    }
                }
            }
        }

        let mut manifests: BTreeMap<u8, Vec<u32>> =
            fleet.iter().take(3).map(|t| (t.id(), Vec::new())).collect();

        // First wave: deadline units (groups stay whole) up to the cap;
        // the first unit that does not fit closes the truck and everything
        // after it spills to truck 2.
        let deadline_ids: Vec<u32> = deadline.iter().copied().collect();
        let first_cap = self.first_wave_cap.min(fleet[0].capacity());
        let mut closed = false;
        for unit in units_of(&deadline_ids, &groups, &group_of) {
            let wave = manifests.get_mut(&first).expect("first truck present");
            if !closed && wave.len() + unit.len() <= first_cap {
                wave.extend(unit);
            } else {
                closed = true;
                manifests
                    .get_mut(&second)
                    .expect("second truck present")
                    .extend(unit);
            }
        }

        // Locked packages ride the truck their note names.
        for &id in &buckets.locked {
            let target = store
                .get(id)
                .and_then(|p| p.truck_lock())
                .unwrap_or(second);
            manifests
                .get_mut(&target)
                .ok_or(DispatchError::UnknownTruck {
                    truck: target,
                    package: id,
                })?
                .push(id);
        }

        // Fill truck 2 to capacity from the unconstrained bucket, again in
        // group-atomic units; the rest joins the delayed third wave.
        let mut third_wave = buckets.delayed.clone();
        let second_cap = fleet[1].capacity();
        let mut closed = false;
        for unit in units_of(&unconstrained, &groups, &group_of) {
            let second_manifest = manifests.get_mut(&second).expect("second truck present");
            if !closed && second_manifest.len() + unit.len() <= second_cap {
                second_manifest.extend(unit);
            } else {
                closed = true;
                third_wave.extend(unit);
            }
        }
        manifests
            .get_mut(&third)
            .expect("third truck present")
            .extend(third_wave);

        // Hard capacity is checked on every truck; the deadline spill path
        // may overfill truck 2 past its nominal share but never past this.
        for truck in fleet.iter().take(3) {
            let assigned = manifests.get(&truck.id()).map(Vec::len).unwrap_or(0);
            if assigned > truck.capacity() {
                return Err(DispatchError::CapacityExceeded {
                    truck: truck.id(),
                    assigned,
                    capacity: truck.capacity(),
                });
            }
        }

        for (truck, manifest) in &manifests {
            info!("truck {truck}: {} packages assigned", manifest.len());
        }

        Ok(Assignment {
            manifests,
            late_truck: third,
            late_start: self.late_start,
        })
    }
}

/// Splits an id list into group-atomic units, preserving id order.
///
/// A unit is either a whole linked group (its members restricted to `ids`)
/// or a singleton. Units surface in order of their first member.
fn units_of(ids: &[u32], groups: &[Vec<u32>], group_of: &HashMap<u32, usize>) -> Vec<Vec<u32>> {
    let members: BTreeSet<u32> = ids.iter().copied().collect();
    let mut emitted: BTreeSet<u32> = BTreeSet::new();
    let mut units = Vec::new();
    for &id in ids {
        if emitted.contains(&id) {
            continue;
        }
        let unit: Vec<u32> = match group_of.get(&id) {
            Some(&gi) => groups[gi]
                .iter()
                .copied()
                .filter(|m| members.contains(m))
                .collect(),
            None => vec![id],
        };
        emitted.extend(unit.iter().copied());
        units.push(unit);
    }
    units
}
