use crate::coord::CoordinatePair;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Counters describing a pool at one point in time.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Slots ever created by this pool.
    pub allocated: usize,
    /// Slots sitting on the freelist, ready for reuse.
    pub free: usize,
    /// Slots currently held by a handle.
    pub live: usize,
}

/// Unbounded freelist of boxed records.
///
/// `acquire` hands out a recycled box when one is available and allocates
/// otherwise; `release` puts the box back. Nothing is ever evicted.
#[derive(Debug)]
pub struct Pool<T> {
    free: Vec<Box<T>>,
    allocated: usize,
    live: usize,
}

impl<T: Default> Pool<T> {
    pub fn new() -> Self {
        Self { free: Vec::new(), allocated: 0, live: 0 }
    }

    /// Creates a pool with `capacity` slots already on the freelist.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut pool = Self { free: Vec::with_capacity(capacity), allocated: 0, live: 0 };
        pool.reserve(capacity);
        pool
    }

    /// Allocates `additional` fresh slots straight onto the freelist.
    pub fn reserve(&mut self, additional: usize) {
        self.free.reserve(additional);
        for _ in 0..additional {
            self.free.push(Box::default());
        }
        self.allocated += additional;
    }

    pub fn acquire(&mut self) -> Box<T> {
        self.live += 1;
        match self.free.pop() {
            Some(item) => item,
            None => {
                self.allocated += 1;
                trace!("Pool grew to {} slots.", self.allocated);
                Box::default()
            }
        }
    }

    /// Puts `item` on the freelist. A box this pool never handed out is
    /// still accepted; it just does not count as a returned handle.
    pub fn release(&mut self, item: Box<T>) {
        self.live = self.live.saturating_sub(1);
        self.free.push(item);
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn allocated(&self) -> usize {
        self.allocated
    }

    pub fn live(&self) -> usize {
        self.live
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats { allocated: self.allocated, free: self.free_count(), live: self.live() }
    }
}

impl<T: Default> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    // One pool per thread; vectors are !Send so a slot always returns home.
    static COORD_POOL: RefCell<Pool<CoordinatePair>> = RefCell::new(Pool::new());
}

/// Takes a coordinate slot from this thread's pool, initialized to `(x, y)`.
pub fn acquire_pair(x: f64, y: f64) -> Box<CoordinatePair> {
    let mut pair = COORD_POOL.with(|pool| pool.borrow_mut().acquire());
    pair.set(x, y);
    pair
}

/// Returns a coordinate slot to this thread's pool.
///
/// During thread teardown the pool may already be gone; the box is then
/// simply freed.
pub fn release_pair(pair: Box<CoordinatePair>) {
    let _ = COORD_POOL.try_with(move |pool| pool.borrow_mut().release(pair));
}

/// Counters of this thread's coordinate pool.
pub fn stats() -> PoolStats {
    COORD_POOL.with(|pool| pool.borrow().stats())
}

/// Puts `count` fresh slots on this thread's freelist so the first frames do
/// not allocate.
pub fn prewarm(count: usize) {
    COORD_POOL.with(|pool| {
        let mut pool = pool.borrow_mut();
        pool.reserve(count);
        debug!("Pre-warmed coordinate pool: {:?}", pool.stats());
    });
}
