//! Keyed package store with deterministic enumeration.

use std::collections::BTreeMap;

use super::Package;

/// A store of packages keyed by id.
///
/// Inserting an existing id overwrites the previous record (last write
/// wins). Enumeration is always ordered by id — downstream reports and
/// assignment tie-breaks depend on that determinism.
///
/// # Examples
///
/// ```
/// use parcel_dispatch::models::{Package, PackageStore};
///
/// let mut store = PackageStore::new();
/// store.insert(Package::new(2, "2530 S 500 E", "Salt Lake City", "UT", "84106"));
/// store.insert(Package::new(1, "195 W Oakland Ave", "Salt Lake City", "UT", "84115"));
/// assert_eq!(store.len(), 2);
/// let ids: Vec<u32> = store.all().map(|p| p.id()).collect();
/// assert_eq!(ids, vec![1, 2]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PackageStore {
    packages: BTreeMap<u32, Package>,
}

impl PackageStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            packages: BTreeMap::new(),
        }
    }

    /// Inserts a package, replacing any existing record with the same id.
    pub fn insert(&mut self, package: Package) {
        self.packages.insert(package.id(), package);
    }

    /// Looks up a package by id.
    pub fn get(&self, id: u32) -> Option<&Package> {
        self.packages.get(&id)
    }

    /// Looks up a package by id for mutation.
    pub fn get_mut(&mut self, id: u32) -> Option<&mut Package> {
        self.packages.get_mut(&id)
    }

    /// Returns `true` if the store holds the given id.
    pub fn contains(&self, id: u32) -> bool {
        self.packages.contains_key(&id)
    }

    /// Iterates all packages in ascending id order.
    pub fn all(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    /// All package ids in ascending order.
    pub fn ids(&self) -> Vec<u32> {
        self.packages.keys().copied().collect()
    }

    /// Number of distinct packages stored.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
