//! Symmetric distance lookup over canonical location keys.

use std::collections::HashMap;

use log::warn;

use super::normalize::canonical_key;

/// Sentinel distance for an unknown pair, treated as +∞.
pub const UNREACHABLE: f64 = f64::INFINITY;

/// A symmetric distance table keyed by canonical location keys.
///
/// Both directions of every pair are written at insert time, so lookup
/// never depends on a runtime fallback search. An alias table from raw
/// labels to canonical keys, built as pairs are inserted, absorbs label
/// skew between the two data sources. Lookup fails closed: an unknown
/// pair resolves to [`UNREACHABLE`].
///
/// # Examples
///
/// ```
/// use parcel_dispatch::distance::{LocationIndex, UNREACHABLE};
///
/// let mut index = LocationIndex::new();
/// index.insert("HUB", "195 W Oakland Ave", 3.5);
/// assert_eq!(index.distance("HUB", "195 W Oakland Ave"), 3.5);
/// assert_eq!(index.distance("195 W Oakland Ave", "HUB"), 3.5);
/// assert_eq!(index.distance("HUB", "nowhere"), UNREACHABLE);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    distances: HashMap<String, HashMap<String, f64>>,
    aliases: HashMap<String, String>,
}

impl LocationIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            distances: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Records the distance between two raw location labels.
    ///
    /// Both labels are canonicalized, both lookup directions are written,
    /// and the raw labels are remembered as aliases for their canonical
    /// keys. Negative distances are rejected as data faults.
    pub fn insert(&mut self, from: &str, to: &str, miles: f64) {
        if !(miles >= 0.0) {
            warn!("dropping negative/NaN distance {miles} between {from:?} and {to:?}");
            return;
        }
        let key_from = canonical_key(from);
        let key_to = canonical_key(to);
        if key_from.is_empty() || key_to.is_empty() {
            warn!("dropping distance with unnormalizable endpoint: {from:?} -> {to:?}");
            return;
        }
        self.alias(from, &key_from);
        self.alias(to, &key_to);
        self.distances
            .entry(key_from.clone())
            .or_default()
            .insert(key_to.clone(), miles);
        self.distances.entry(key_to).or_default().insert(key_from, miles);
    }

    /// Distance between two raw location strings, in miles.
    ///
    /// Lookup order: exact canonical match (forward, then reverse), then
    /// the alias table tried in both orders, then [`UNREACHABLE`].
    pub fn distance(&self, a: &str, b: &str) -> f64 {
        let key_a = canonical_key(a);
        let key_b = canonical_key(b);
        if let Some(d) = self.lookup(&key_a, &key_b) {
            return d;
        }
        let alias_a = self.aliases.get(a.trim());
        let alias_b = self.aliases.get(b.trim());
        match (alias_a, alias_b) {
            (Some(ka), Some(kb)) => self.lookup(ka, kb),
            (Some(ka), None) => self.lookup(ka, &key_b),
            (None, Some(kb)) => self.lookup(&key_a, kb),
            (None, None) => None,
        }
        .unwrap_or(UNREACHABLE)
    }

    /// Registers an explicit alias: `raw` will resolve wherever `target`
    /// does. Covers label skew normalization cannot absorb (e.g. a
    /// name-only label for an address the table knows by street).
    pub fn register_alias(&mut self, raw: &str, target: &str) {
        let key = self.resolve_key(target);
        self.alias(raw, &key);
    }

    /// Resolves a raw location string to the canonical key the index knows
    /// it by, falling back to the plain canonical form.
    pub fn resolve_key(&self, raw: &str) -> String {
        let key = canonical_key(raw);
        if self.distances.contains_key(&key) {
            return key;
        }
        self.aliases.get(raw.trim()).cloned().unwrap_or(key)
    }

    /// Returns `true` if the canonical key has any recorded distances.
    pub fn contains(&self, raw: &str) -> bool {
        self.distances.contains_key(&canonical_key(raw))
    }

    /// Number of known locations.
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Returns `true` if no distances have been recorded.
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Known canonical keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.distances.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Returns `true` if every recorded pair reads the same in both
    /// directions within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        self.distances.iter().all(|(from, row)| {
            row.iter().all(|(to, &d)| {
                self.distances
                    .get(to)
                    .and_then(|r| r.get(from))
                    .map(|&back| (back - d).abs() <= tol)
                    .unwrap_or(false)
            })
        })
    }

    fn lookup(&self, a: &str, b: &str) -> Option<f64> {
        if let Some(d) = self.distances.get(a).and_then(|row| row.get(b)) {
            return Some(*d);
        }
        self.distances.get(b).and_then(|row| row.get(a)).copied()
    }

    // Maps the whole trimmed label and each of its lines to the key, so a
    // name-only query line still resolves to the address it labels.
    fn alias(&mut self, raw: &str, key: &str) {
        let raw = raw.trim();
        if raw.is_empty() {
            return;
        }
        if raw != key {
            self.aliases.insert(raw.to_string(), key.to_string());
        }
        for line in raw.lines() {
            let line = line.trim();
            if !line.is_empty() && line != key {
                self.aliases.insert(line.to_string(), key.to_string());
            }
        }
    }
}
