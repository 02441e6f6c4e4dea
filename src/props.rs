// props.rs
pub mod accessor;
pub mod config;
pub mod error;
pub mod instance_map;
pub mod reference_map;
pub mod type_tag;

use instance_map::InstanceMap;

/// How a [`ReferenceMap`](reference_map::ReferenceMap) builds the bucket of a
/// host it has not seen before.
pub trait NewBucket {
    /// Fresh, empty bucket. `slots` is a preallocation hint.
    fn with_slots(slots: usize) -> Self;
}

/// Per-host bucket whose slots the accessor's typed helpers can reach.
///
/// [`InstanceMap`] is the plain bucket. Custom buckets wrap one and add their
/// own state.
pub trait Bucket<V>: NewBucket {
    fn instances(&self) -> &InstanceMap<V>;
    fn instances_mut(&mut self) -> &mut InstanceMap<V>;
}

impl<V> NewBucket for InstanceMap<V> {
    fn with_slots(slots: usize) -> Self {
        InstanceMap::with_capacity(slots)
    }
}

impl<V> Bucket<V> for InstanceMap<V> {
    fn instances(&self) -> &InstanceMap<V> {
        self
    }

    fn instances_mut(&mut self) -> &mut InstanceMap<V> {
        self
    }
}
