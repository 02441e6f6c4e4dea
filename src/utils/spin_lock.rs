// spin_lock.rs

use std::{
    cell::UnsafeCell,
    marker::PhantomData,
    ops::{Deref, DerefMut},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

static NEXT_THREAD_TOKEN: AtomicUsize = AtomicUsize::new(1);

thread_local! {
    static THREAD_TOKEN: usize = NEXT_THREAD_TOKEN.fetch_add(1, Ordering::Relaxed);
}

fn thread_token() -> usize {
    THREAD_TOKEN.with(|token| *token)
}

/// Test-and-set lock. Critical sections in this crate are a single hash
/// lookup or a few slot reads and writes, so waiters spin instead of parking.
///
/// The holding thread is recorded; locking again from that thread panics
/// instead of spinning forever.
pub struct SpinLock<T> {
    locked: AtomicBool,
    owner: AtomicUsize,
    data: UnsafeCell<T>,
}

pub struct Guard<'a, T> {
    lock: &'a SpinLock<T>,
    _not_send: PhantomData<*const ()>,
}

/// Guard that keeps its lock alive through an [`Arc`].
pub struct ArcGuard<T> {
    lock: Arc<SpinLock<T>>,
    _not_send: PhantomData<*const ()>,
}

impl<'a, T> Guard<'a, T> {
    fn new(lock: &'a SpinLock<T>) -> Self {
        Self {
            lock,
            _not_send: PhantomData,
        }
    }
}

impl<'a, T> Drop for Guard<'a, T> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}

impl<'a, T> Deref for Guard<'a, T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        unsafe { &*self.lock.data.get() }
    }
}

impl<'a, T> DerefMut for Guard<'a, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> ArcGuard<T> {
    fn new(lock: Arc<SpinLock<T>>) -> Self {
        Self {
            lock,
            _not_send: PhantomData,
        }
    }
}

impl<T> Drop for ArcGuard<T> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}

impl<T> Deref for ArcGuard<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for ArcGuard<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> SpinLock<T> {
    pub const fn new(data: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            owner: AtomicUsize::new(0),
            data: UnsafeCell::new(data),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// Panics if the calling thread already holds this lock.
    pub fn lock(&self) -> Guard<'_, T> {
        self.acquire();
        Guard::new(self)
    }

    pub fn try_lock(&self) -> Option<Guard<'_, T>> {
        self.try_acquire().then(|| Guard::new(self))
    }

    /// Panics if the calling thread already holds this lock.
    pub fn lock_arc(self: &Arc<Self>) -> ArcGuard<T> {
        self.acquire();
        ArcGuard::new(Arc::clone(self))
    }

    pub fn try_lock_arc(self: &Arc<Self>) -> Option<ArcGuard<T>> {
        self.try_acquire().then(|| ArcGuard::new(Arc::clone(self)))
    }

    fn acquire(&self) {
        let me = thread_token();
        // only this thread ever stores its own token, so a relaxed read
        // sees it exactly when this thread holds the lock
        if self.owner.load(Ordering::Relaxed) == me {
            panic!("SpinLock is already held by this thread");
        }
        while self.locked.swap(true, Ordering::Acquire) {
            while self.is_locked() {
                std::hint::spin_loop();
            }
        }
        self.owner.store(me, Ordering::Relaxed);
    }

    fn try_acquire(&self) -> bool {
        if self.locked.swap(true, Ordering::Acquire) {
            return false;
        }
        self.owner.store(thread_token(), Ordering::Relaxed);
        true
    }

    fn unlock(&self) {
        self.owner.store(0, Ordering::Relaxed);
        self.locked.store(false, Ordering::Release);
    }
}

unsafe impl<T: Send> Sync for SpinLock<T> {}
unsafe impl<'a, T: Sync> Sync for Guard<'a, T> {}
unsafe impl<T: Sync> Sync for ArcGuard<T> {}
