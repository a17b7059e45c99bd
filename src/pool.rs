use core::fmt;
use std::sync::Arc;

use crate::lock::Mutex;
use crate::util::Unquote;

// -------------------------------------------------------------------------------------------------

/// Destination for items that have been superseded and may be reused.
///
/// [`ConflatingQueue`](crate::ConflatingQueue) hands displaced items to a `Recycle`
/// implementation when configured with [`pool()`](crate::ConflatingQueueBuilder::pool).
/// [`Pool`] is the provided implementation.
///
/// Implementations must not call back into the container that is recycling into them.
pub trait Recycle<T> {
    /// Takes ownership of `item` for later reuse, or drops it.
    fn recycle(&self, item: T);
}

impl<T, R: Recycle<T> + ?Sized> Recycle<T> for Arc<R> {
    fn recycle(&self, item: T) {
        (**self).recycle(item)
    }
}

impl<T, R: Recycle<T> + ?Sized> Recycle<T> for &R {
    fn recycle(&self, item: T) {
        (**self).recycle(item)
    }
}

// -------------------------------------------------------------------------------------------------

/// A bounded pool of reusable items.
///
/// The pool starts full. [`acquire()`](Self::acquire) never fails: when the pool is empty a fresh
/// item is made. [`recycle()`](Self::recycle) resets an item and keeps it unless the pool is
/// already at capacity, in which case the item is dropped.
///
/// ```
/// use conflate::Pool;
///
/// let pool = Pool::new(2, Vec::<u8>::new, Vec::clear);
/// let mut buf = pool.acquire();
/// buf.extend_from_slice(b"hello");
/// pool.recycle(buf);
///
/// assert_eq!(pool.len(), 2);
/// assert!(pool.acquire().is_empty(), "recycled items are reset");
/// ```
pub struct Pool<T> {
    items: Mutex<Vec<T>>,
    capacity: usize,
    make: Box<dyn Fn() -> T + Send + Sync>,
    reset: Box<dyn Fn(&mut T) + Send + Sync>,
}

impl<T> Pool<T> {
    /// Constructs a pool holding `capacity` items made by `make`.
    ///
    /// `make` is also used whenever [`acquire()`](Self::acquire) finds the pool empty, and
    /// `reset` is applied to every item passed to [`recycle()`](Self::recycle).
    pub fn new<M, R>(capacity: usize, make: M, reset: R) -> Self
    where
        M: Fn() -> T + Send + Sync + 'static,
        R: Fn(&mut T) + Send + Sync + 'static,
    {
        let items = core::iter::repeat_with(&make).take(capacity).collect();
        Self {
            items: Mutex::new(items),
            capacity,
            make: Box::new(make),
            reset: Box::new(reset),
        }
    }

    /// Constructs a pool whose items are made and reset with [`T::default()`](Default).
    #[must_use]
    pub fn from_default(capacity: usize) -> Self
    where
        T: Default + 'static,
    {
        Self::new(capacity, T::default, |item: &mut T| *item = T::default())
    }

    /// Removes an item from the pool, or makes a fresh one if the pool is empty.
    #[must_use]
    pub fn acquire(&self) -> T {
        // Release the lock before running `make`.
        let stored = self.items.lock().pop();
        stored.unwrap_or_else(|| (self.make)())
    }

    /// Resets `item` and returns it to the pool.
    ///
    /// If the pool already holds [`capacity()`](Self::capacity) items, `item` is dropped.
    pub fn recycle(&self, mut item: T) {
        (self.reset)(&mut item);
        let mut items = self.items.lock();
        if items.len() < self.capacity {
            items.push(item);
            tracing::trace!(len = items.len(), "recycled item into pool");
        } else {
            drop(items);
            tracing::debug!(capacity = self.capacity, "pool full; dropping recycled item");
        }
    }

    /// Returns the number of items currently available without making new ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Returns whether the next [`acquire()`](Self::acquire) will have to make a new item.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Returns the maximum number of items the pool retains.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Recycle<T> for Pool<T> {
    fn recycle(&self, item: T) {
        Pool::recycle(self, item)
    }
}

impl<T> fmt::Debug for Pool<T> {
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ds = f.debug_struct("Pool");
        ds.field("type", &Unquote::type_name::<T>());
        match self.items.try_lock() {
            Some(items) => ds.field("len", &items.len()),
            None => ds.field("len", &crate::util::Contended),
        };
        ds.field("capacity", &self.capacity).finish()
    }
}
