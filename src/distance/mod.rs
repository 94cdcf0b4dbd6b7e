//! Address canonicalization and symmetric distance lookup.
//!
//! Real-world address strings arrive inconsistently formatted across the
//! two data sources; [`canonical_key`] absorbs that skew in a single pure
//! normalization pass, and [`LocationIndex`] resolves distances over the
//! canonical keys with an alias table for raw labels.

mod index;
mod normalize;

pub use index::{LocationIndex, UNREACHABLE};
pub use normalize::{canonical_key, HUB};
