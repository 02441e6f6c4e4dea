// any_map.rs

use std::any::{Any, TypeId};

use ahash::AHashMap;

/// One value per concrete type. Values must be shareable across threads so
/// the map can sit behind a process-wide lock.
pub struct AnyMap {
    data: AHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl AnyMap {
    pub fn new() -> Self {
        Self {
            data: AHashMap::new(),
        }
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.data
            .get(&TypeId::of::<T>())
            .and_then(|boxed_val| boxed_val.downcast_ref::<T>())
    }

    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.data.insert(TypeId::of::<T>(), Box::new(value));
    }
}
