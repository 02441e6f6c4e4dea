// accessor.rs

use std::{
    any::type_name,
    hash::Hash,
    marker::PhantomData,
    mem,
    ops::{Deref, DerefMut},
    sync::Arc,
};

use tracing::debug;

use super::{
    config::MapConfig,
    error::{AccessorError, Result},
    instance_map::InstanceMap,
    reference_map::ReferenceMap,
    type_tag::TypeTag,
    Bucket, NewBucket,
};
use crate::utils::{
    any_map::AnyMap,
    spin_lock::{ArcGuard, SpinLock},
};

/// Process-wide accessors, one per `Accessor<K, V, B>` type. Entries are
/// leaked and live until exit.
static GLOBAL_ACCESSORS: SpinLock<Option<AnyMap>> = SpinLock::new(None);

/// A bucket as the accessor stores it: shared with any live [`HostSlot`]
/// and locked on its own.
type SharedBucket<B> = Arc<SpinLock<B>>;

impl<B: NewBucket> NewBucket for SharedBucket<B> {
    fn with_slots(slots: usize) -> Self {
        Arc::new(SpinLock::new(B::with_slots(slots)))
    }
}

/// Attaches values of type `V` to hosts identified by `K`, one slot per
/// [`TypeTag`].
///
/// Construct one with [`Accessor::new`] and hand it to whoever needs it, or
/// use [`Accessor::global`] for the shared instance of this type binding.
///
/// The host map is locked only for the get-or-create of a bucket; every
/// bucket has a lock of its own. Slots of different hosts can be held at the
/// same time, also within one expression. Asking for a host whose slot the
/// current thread already holds panics.
pub struct Accessor<K, V, B = InstanceMap<V>> {
    refs: SpinLock<ReferenceMap<K, V, SharedBucket<B>>>,
}

/// Accessor with the plain [`InstanceMap`] bucket.
pub type BasicAccessor<K, V> = Accessor<K, V, InstanceMap<V>>;

/// Locked access to one host's bucket. Only that host is locked.
pub struct HostSlot<'a, B> {
    guard: ArcGuard<B>,
    _accessor: PhantomData<&'a ()>,
}

impl<'a, B> HostSlot<'a, B> {
    fn new(guard: ArcGuard<B>) -> Self {
        Self {
            guard,
            _accessor: PhantomData,
        }
    }
}

impl<'a, B> Deref for HostSlot<'a, B> {
    type Target = B;
    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl<'a, B> DerefMut for HostSlot<'a, B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

impl<K, V, B> Default for Accessor<K, V, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, B> Accessor<K, V, B> {
    pub fn new() -> Self {
        Self {
            refs: SpinLock::new(ReferenceMap::new()),
        }
    }

    pub fn with_config(config: &MapConfig) -> Self {
        Self {
            refs: SpinLock::new(ReferenceMap::with_config(config)),
        }
    }

    pub fn host_count(&self) -> usize {
        self.refs.lock().len()
    }
}

impl<K: Eq + Hash, V, B: Bucket<V>> Accessor<K, V, B> {
    /// Bucket of `key`, created on first use. Waits while another thread
    /// holds the slot of the same host.
    ///
    /// # Panics
    ///
    /// If the calling thread already holds the slot of `key`.
    pub fn for_host(&self, key: K) -> HostSlot<'_, B> {
        let bucket = Arc::clone(self.refs.lock().get(key));
        HostSlot::new(bucket.lock_arc())
    }

    /// Like [`for_host`](Self::for_host) but fails with
    /// [`AccessorError::Contended`] instead of waiting or panicking.
    pub fn try_for_host(&self, key: K) -> Result<HostSlot<'_, B>> {
        let bucket = {
            let mut refs = self.refs.try_lock().ok_or(AccessorError::Contended)?;
            Arc::clone(refs.get(key))
        };
        let guard = bucket.try_lock_arc().ok_or(AccessorError::Contended)?;
        Ok(HostSlot::new(guard))
    }

    pub fn with_host<R>(&self, key: K, f: impl FnOnce(&mut B) -> R) -> R {
        f(&mut self.for_host(key))
    }

    /// Value in the `T` slot of `key`, or `V::default()`.
    pub fn get<T: ?Sized + 'static>(&self, key: K) -> V
    where
        V: Default + Clone,
    {
        self.with_host(key, |bucket| bucket.instances().get(TypeTag::of::<T>()))
    }

    pub fn set<T: ?Sized + 'static>(&self, key: K, value: V) -> Option<V> {
        self.with_host(key, |bucket| {
            bucket.instances_mut().set(TypeTag::of::<T>(), value)
        })
    }

    pub fn contains_host(&self, key: &K) -> bool {
        self.refs.lock().contains_host(key)
    }

    /// Swaps in `bucket` for `key`, returning the previous contents. Waits
    /// while another thread holds the slot of `key`.
    pub fn replace_host(&self, key: K, bucket: B) -> Option<B> {
        let mut refs = self.refs.lock();
        let Some(shared) = refs.peek(&key).map(Arc::clone) else {
            refs.set(key, Arc::new(SpinLock::new(bucket)));
            return None;
        };
        drop(refs);
        let mut current = shared.lock_arc();
        Some(mem::replace(&mut *current, bucket))
    }

    /// Removes `key` from the accessor and returns its contents. A slot still
    /// held for it keeps an emptied, detached bucket.
    pub fn evict_host(&self, key: &K) -> Option<B> {
        let shared = self.refs.lock().evict(key)?;
        let mut current = shared.lock_arc();
        Some(mem::replace(&mut *current, B::with_slots(0)))
    }
}

impl<K, V, B> Accessor<K, V, B>
where
    K: Eq + Hash + Send + 'static,
    V: 'static,
    B: Bucket<V> + Send + 'static,
{
    /// The process-wide accessor for this `(K, V, B)` binding, created on the
    /// first call and never torn down.
    pub fn global() -> &'static Self {
        let mut registry = GLOBAL_ACCESSORS.lock();
        let registry = registry.get_or_insert_with(AnyMap::new);
        if let Some(&accessor) = registry.get::<&'static Self>() {
            return accessor;
        }

        let accessor: &'static Self = Box::leak(Box::new(Self::new()));
        debug!(
            host = type_name::<K>(),
            value = type_name::<V>(),
            bucket = type_name::<B>(),
            "created process-wide accessor"
        );
        registry.insert(accessor);
        accessor
    }
}
