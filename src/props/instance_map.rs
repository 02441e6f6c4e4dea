// instance_map.rs

use std::collections::hash_map;

use ahash::AHashMap;
use tracing::trace;

use super::{
    error::{AccessorError, Result},
    type_tag::TypeTag,
};

/// Per-host bucket: one value slot per [`TypeTag`].
///
/// Reads of an unwritten slot yield `V::default()` and leave the map
/// untouched; only [`set`](Self::set) materializes an entry. There is no
/// removal.
#[derive(Debug, Clone)]
pub struct InstanceMap<V> {
    map: AHashMap<TypeTag, V>,
}

impl<V> Default for InstanceMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> InstanceMap<V> {
    pub fn new() -> Self {
        Self {
            map: AHashMap::new(),
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            map: AHashMap::with_capacity(cap),
        }
    }

    pub fn get_ref(&self, tag: TypeTag) -> Option<&V> {
        self.map.get(&tag)
    }

    pub fn get_mut(&mut self, tag: TypeTag) -> Option<&mut V> {
        self.map.get_mut(&tag)
    }

    /// Strict read. Unlike [`get`](Self::get) a missing slot is an error.
    pub fn require(&self, tag: TypeTag) -> Result<&V> {
        self.map.get(&tag).ok_or(AccessorError::SlotMissing {
            type_name: tag.name(),
        })
    }

    /// Stores `value` under `tag`, returning what was there before.
    pub fn set(&mut self, tag: TypeTag, value: V) -> Option<V> {
        trace!(slot = %tag, "slot written");
        self.map.insert(tag, value)
    }

    pub fn set_typed<T: ?Sized + 'static>(&mut self, value: V) -> Option<V> {
        self.set(TypeTag::of::<T>(), value)
    }

    pub fn get_typed_ref<T: ?Sized + 'static>(&self) -> Option<&V> {
        self.get_ref(TypeTag::of::<T>())
    }

    pub fn contains(&self, tag: TypeTag) -> bool {
        self.map.contains_key(&tag)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Tags of the slots that have been written, in no particular order.
    pub fn tags(&self) -> impl Iterator<Item = TypeTag> + '_ {
        self.map.keys().copied()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, TypeTag, V> {
        self.map.iter()
    }
}

impl<V: Default + Clone> InstanceMap<V> {
    /// Value stored under `tag`, or `V::default()` when the slot was never
    /// written. Never inserts.
    pub fn get(&self, tag: TypeTag) -> V {
        self.map.get(&tag).cloned().unwrap_or_default()
    }

    pub fn get_typed<T: ?Sized + 'static>(&self) -> V {
        self.get(TypeTag::of::<T>())
    }
}

impl<'a, V> IntoIterator for &'a InstanceMap<V> {
    type Item = (&'a TypeTag, &'a V);
    type IntoIter = hash_map::Iter<'a, TypeTag, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
