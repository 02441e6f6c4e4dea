// config.rs

use serde::{Deserialize, Serialize};

/// Preallocation hints for a [`ReferenceMap`](super::reference_map::ReferenceMap).
///
/// Meant to be embedded in the host program's own configuration; missing
/// fields fall back to zero, i.e. allocate on first write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Host buckets reserved up front.
    pub initial_hosts: usize,
    /// Slots reserved in every newly created bucket.
    pub initial_slots: usize,
}

impl MapConfig {
    pub fn new(initial_hosts: usize, initial_slots: usize) -> Self {
        Self {
            initial_hosts,
            initial_slots,
        }
    }
}
