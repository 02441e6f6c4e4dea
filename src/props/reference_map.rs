// reference_map.rs

use std::{
    collections::hash_map::{self, Entry},
    hash::Hash,
    marker::PhantomData,
};

use ahash::AHashMap;
use tracing::{debug, trace};

use super::{
    config::MapConfig,
    error::{AccessorError, Result},
    instance_map::InstanceMap,
    NewBucket,
};

/// Host key → bucket, with get-or-create lookups.
///
/// Buckets are held strongly: an entry stays until [`evict`](Self::evict) is
/// called or the map is dropped, whether or not the host is still alive
/// elsewhere. Growth is unbounded.
#[derive(Debug)]
pub struct ReferenceMap<K, V, B = InstanceMap<V>> {
    buckets: AHashMap<K, B>,
    slot_capacity: usize,
    _value: PhantomData<fn() -> V>,
}

impl<K, V, B> Default for ReferenceMap<K, V, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, B> ReferenceMap<K, V, B> {
    pub fn new() -> Self {
        Self {
            buckets: AHashMap::new(),
            slot_capacity: 0,
            _value: PhantomData,
        }
    }

    pub fn with_config(config: &MapConfig) -> Self {
        Self {
            buckets: AHashMap::with_capacity(config.initial_hosts),
            slot_capacity: config.initial_slots,
            _value: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn hosts(&self) -> hash_map::Keys<'_, K, B> {
        self.buckets.keys()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, K, B> {
        self.buckets.iter()
    }
}

impl<K: Eq + Hash, V, B: NewBucket> ReferenceMap<K, V, B> {
    /// Bucket for `key`, created empty and stored on first use. Every call
    /// with an equal key returns the same stored bucket.
    pub fn get(&mut self, key: K) -> &mut B {
        let hosts = self.buckets.len();
        let slots = self.slot_capacity;
        match self.buckets.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                trace!(hosts = hosts + 1, "created bucket for new host");
                entry.insert(B::with_slots(slots))
            }
        }
    }

    /// Replaces the bucket stored for `key`, returning the old one.
    pub fn set(&mut self, key: K, bucket: B) -> Option<B> {
        self.buckets.insert(key, bucket)
    }

    /// Read without creating.
    pub fn peek(&self, key: &K) -> Option<&B> {
        self.buckets.get(key)
    }

    pub fn require(&self, key: &K) -> Result<&B> {
        self.buckets.get(key).ok_or(AccessorError::HostMissing)
    }

    pub fn contains_host(&self, key: &K) -> bool {
        self.buckets.contains_key(key)
    }

    /// Drops the bucket for `key`. Lookups never call this; a caller that
    /// knows a host is gone uses it to reclaim the entry.
    pub fn evict(&mut self, key: &K) -> Option<B> {
        let evicted = self.buckets.remove(key);
        if evicted.is_some() {
            debug!(hosts = self.buckets.len(), "evicted host bucket");
        }
        evicted
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::ReferenceMap;
    use crate::props::{
        config::MapConfig, error::AccessorError, instance_map::InstanceMap, type_tag::TypeTag,
        Bucket, NewBucket,
    };

    struct Health;
    struct Mana;
    struct Armor;
    struct Speed;

    fn tag_for(slot: u8) -> TypeTag {
        match slot % 4 {
            0 => TypeTag::of::<Health>(),
            1 => TypeTag::of::<Mana>(),
            2 => TypeTag::of::<Armor>(),
            _ => TypeTag::of::<Speed>(),
        }
    }

    #[test]
    fn unseen_host_gets_one_empty_bucket() {
        let mut refs: ReferenceMap<&str, i32> = ReferenceMap::new();
        assert!(refs.get("a").is_empty());
        let first: *const InstanceMap<i32> = refs.get("a");
        let second: *const InstanceMap<i32> = refs.get("a");
        assert_eq!(first, second);
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn repeated_gets_create_a_single_bucket() {
        let mut refs: ReferenceMap<u32, i32> = ReferenceMap::new();
        for _ in 0..10 {
            refs.get(7);
        }
        assert_eq!(refs.len(), 1);
        assert_eq!(refs.hosts().copied().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn writes_through_get_are_visible_later() {
        let mut refs: ReferenceMap<u32, i32> = ReferenceMap::new();
        refs.get(1).set_typed::<Health>(5);
        assert_eq!(refs.get(1).get_typed::<Health>(), 5);
        assert_eq!(refs.get(2).get_typed::<Health>(), 0);
    }

    #[test]
    fn set_replaces_bucket() {
        let mut refs: ReferenceMap<u32, i32> = ReferenceMap::new();
        refs.get(1).set_typed::<Health>(5);

        let mut replacement = InstanceMap::new();
        replacement.set_typed::<Mana>(9);
        let old = refs.set(1, replacement).unwrap();

        assert_eq!(old.get_typed::<Health>(), 5);
        assert_eq!(refs.get(1).get_typed::<Health>(), 0);
        assert_eq!(refs.get(1).get_typed::<Mana>(), 9);
    }

    #[test]
    fn peek_and_require_do_not_create() {
        let mut refs: ReferenceMap<u32, i32> = ReferenceMap::new();
        assert!(refs.peek(&3).is_none());
        assert_eq!(refs.require(&3).unwrap_err(), AccessorError::HostMissing);
        assert!(!refs.contains_host(&3));
        assert!(refs.is_empty());

        refs.get(3);
        assert!(refs.require(&3).is_ok());
    }

    #[test]
    fn evict_removes_only_that_host() {
        let mut refs: ReferenceMap<u32, i32> = ReferenceMap::new();
        refs.get(1).set_typed::<Health>(1);
        refs.get(2).set_typed::<Health>(2);

        let evicted = refs.evict(&1).unwrap();
        assert_eq!(evicted.get_typed::<Health>(), 1);
        assert!(refs.evict(&1).is_none());
        assert_eq!(refs.len(), 1);
        assert_eq!(refs.get(2).get_typed::<Health>(), 2);
        assert_eq!(refs.get(1).get_typed::<Health>(), 0);
    }

    #[test]
    fn config_sizes_new_buckets() {
        let mut refs: ReferenceMap<u32, i32> = ReferenceMap::with_config(&MapConfig::new(8, 4));
        assert!(refs.is_empty());
        refs.get(1).set_typed::<Health>(1);
        assert_eq!(refs.iter().count(), 1);
    }

    struct Tracked {
        slots: InstanceMap<i32>,
        created_with: usize,
    }

    impl NewBucket for Tracked {
        fn with_slots(slots: usize) -> Self {
            Self {
                slots: InstanceMap::with_capacity(slots),
                created_with: slots,
            }
        }
    }

    impl Bucket<i32> for Tracked {
        fn instances(&self) -> &InstanceMap<i32> {
            &self.slots
        }

        fn instances_mut(&mut self) -> &mut InstanceMap<i32> {
            &mut self.slots
        }
    }

    #[test]
    fn custom_bucket_type() {
        let mut refs: ReferenceMap<u32, i32, Tracked> =
            ReferenceMap::with_config(&MapConfig::new(0, 3));
        refs.get(1).instances_mut().set_typed::<Mana>(4);
        assert_eq!(refs.get(1).created_with, 3);
        assert_eq!(refs.get(1).instances().get_typed::<Mana>(), 4);
    }

    proptest! {
        #[test]
        fn matches_a_flat_model(writes in prop::collection::vec((0u8..6, 0u8..4, any::<i64>()), 0..64)) {
            let mut refs: ReferenceMap<u8, i64> = ReferenceMap::new();
            let mut model: HashMap<(u8, u8), i64> = HashMap::new();
            for (host, slot, value) in writes {
                refs.get(host).set(tag_for(slot), value);
                model.insert((host, slot), value);
            }

            for host in 0..6u8 {
                let written = model.keys().filter(|(h, _)| *h == host).count();
                prop_assert_eq!(refs.peek(&host).map_or(0, InstanceMap::len), written);
                for slot in 0..4u8 {
                    let expected = model.get(&(host, slot)).copied().unwrap_or_default();
                    prop_assert_eq!(refs.get(host).get(tag_for(slot)), expected);
                }
            }
        }
    }
}
