use core::fmt;
use core::hash::Hash;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::lock::Mutex;
use crate::{Notified, Notifier, Recycle};

// -------------------------------------------------------------------------------------------------

/// A queue of items `V`, each having a key `K`, which keeps at most one item per key.
///
/// Multiple items may be pushed for the same key, but only the most recent is of interest.
/// Pushing an item whose key is already queued updates that entry in place, so the entry keeps
/// the position at which its key *first* arrived. Distinct keys are popped in that first-arrival
/// order.
///
/// For example, consider a queue of prices. Prices for `A` then `B` are pushed. Another price
/// for `A` replaces the queued one without moving it. The consumer then pops the latest price
/// for `A`, because `A` arrived first, and then the price for `B`:
///
/// ```
/// use conflate::ConflatingQueue;
///
/// #[derive(Debug, PartialEq)]
/// struct Quote { symbol: &'static str, price: u32 }
///
/// let queue = ConflatingQueue::new(|q: &Quote| q.symbol);
/// queue.push(Quote { symbol: "A", price: 1 });
/// queue.push(Quote { symbol: "B", price: 2 });
/// queue.push(Quote { symbol: "A", price: 3 });
///
/// assert_eq!(queue.pop(), Some(Quote { symbol: "A", price: 3 }));
/// assert_eq!(queue.pop(), Some(Quote { symbol: "B", price: 2 }));
/// assert_eq!(queue.pop(), None);
/// ```
///
/// What happens to the superseded item is configured with [`ConflatingQueue::builder()`]:
/// by default it is dropped, it may instead be handed to a [`Pool`](crate::Pool), or the two
/// items may be merged by a function. A merge function takes precedence over a pool.
///
/// # Waking
///
/// The queue owns a [`Notifier`] which is pending exactly when the queue is non-empty (as of the
/// last `push()` or `pop()`). Await [`notified()`](Self::notified) to sleep until there is
/// something to pop. The notification says only that the queue is non-empty, never how many
/// items it holds; call [`pop()`](Self::pop) until it returns [`None`] to drain it.
///
/// # Generic parameters
///
/// * `K` is the key type. It must be [`Clone`] because the queue stores the key of each entry.
/// * `V` is the item type.
pub struct ConflatingQueue<K, V> {
    slots: Mutex<Slots<K, V>>,
    notifier: Notifier,
    key: Box<dyn Fn(&V) -> K + Send + Sync>,
    merge: Option<Box<dyn Fn(&mut V, V) + Send + Sync>>,
    pool: Option<Arc<dyn Recycle<V> + Send + Sync>>,
}

/// Entries in first-arrival order, and the current position of each key among them.
struct Slots<K, V> {
    queue: VecDeque<(K, V)>,
    index: HashMap<K, usize>,
}

/// Options for constructing a [`ConflatingQueue`].
///
/// Obtained from [`ConflatingQueue::builder()`].
#[must_use]
pub struct ConflatingQueueBuilder<K, V> {
    key: Box<dyn Fn(&V) -> K + Send + Sync>,
    merge: Option<Box<dyn Fn(&mut V, V) + Send + Sync>>,
    pool: Option<Arc<dyn Recycle<V> + Send + Sync>>,
    capacity: usize,
}

const DEFAULT_CAPACITY: usize = 128;

impl<K, V> ConflatingQueue<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Constructs an empty queue which replaces superseded items and drops them.
    ///
    /// `key` returns the key of an item. It must return equal keys for items describing the
    /// same entity, and must not call back into the queue.
    pub fn new<F>(key: F) -> Self
    where
        F: Fn(&V) -> K + Send + Sync + 'static,
    {
        Self::builder(key).build()
    }

    /// Returns a builder for a queue using `key` to identify items.
    pub fn builder<F>(key: F) -> ConflatingQueueBuilder<K, V>
    where
        F: Fn(&V) -> K + Send + Sync + 'static,
    {
        ConflatingQueueBuilder {
            key: Box::new(key),
            merge: None,
            pool: None,
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Pushes an item.
    ///
    /// If no item with the same key is queued, `item` is appended.
    /// Otherwise the queued item is updated in place and keeps its position:
    ///
    /// * with a [merge function](ConflatingQueueBuilder::merge), `item` is merged into it;
    /// * else with a [pool](ConflatingQueueBuilder::pool), `item` replaces it and the
    ///   replaced item is recycled (before `push()` returns);
    /// * else `item` replaces it and the replaced item is dropped.
    ///
    /// In all cases the queue’s signal is then pending.
    ///
    /// # Panics
    ///
    /// Panics from the key or merge function propagate. The queue remains consistent: an entry
    /// whose merge panicked stays queued, as far as the merge got, and the signal stays pending.
    pub fn push(&self, item: V) {
        let key = (self.key)(&item);

        let displaced = {
            let mut slots = self.slots.lock();
            if let Some(&position) = slots.index.get(&key) {
                // The entry exists whatever the merge does, so the signal goes up first.
                self.notifier.notify();
                let existing = &mut slots.queue[position].1;
                tracing::trace!(position, "conflating queued item");
                if let Some(merge) = &self.merge {
                    merge(existing, item);
                    None
                } else {
                    Some(core::mem::replace(existing, item))
                }
            } else {
                let position = slots.queue.len();
                slots.queue.push_back((key.clone(), item));
                slots.index.insert(key, position);
                tracing::trace!(position, "appended item");
                self.notifier.notify();
                None
            }
        };

        if let (Some(displaced), Some(pool)) = (displaced, &self.pool) {
            pool.recycle(displaced);
        }
    }

    /// Removes and returns the item at the head of the queue, or [`None`] if it is empty.
    ///
    /// If items remain afterward, the signal is left pending; otherwise it is cleared.
    #[must_use]
    pub fn pop(&self) -> Option<V> {
        let mut slots = self.slots.lock();
        let slots = &mut *slots;

        match slots.queue.len() {
            0 => {
                // Nothing should be pending, but make sure.
                self.notifier.clear();
                None
            }
            1 => {
                let (_, item) = slots.queue.pop_front()?;
                slots.index.clear();
                self.notifier.clear();
                Some(item)
            }
            _ => {
                let (key, item) = slots.queue.pop_front()?;
                slots.index.remove(&key);
                // Every remaining entry moved one place towards the head.
                for position in slots.index.values_mut() {
                    *position -= 1;
                }
                self.notifier.notify();
                Some(item)
            }
        }
    }

    /// Returns the number of distinct keys currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().queue.len()
    }

    /// Returns whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.lock().queue.is_empty()
    }

    /// Returns whether an item with the given key is queued.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.slots.lock().index.contains_key(key)
    }

    /// Returns the queue’s [`Notifier`], which is pending while the queue is non-empty.
    ///
    /// Consumers should only wait on it; calling [`Notifier::notify()`] on it makes the queue
    /// appear non-empty until the next [`pop()`](Self::pop).
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Returns a future which completes when the queue has become non-empty.
    ///
    /// Awaiting it consumes the queue’s signal; the following [`pop()`](Self::pop) re-arms the
    /// signal if further items remain. This is equivalent to `self.notifier().notified()`.
    pub fn notified(&self) -> Notified<'_> {
        self.notifier.notified()
    }

    /// Returns a stream which yields each time the queue becomes non-empty.
    ///
    /// This method is only available if the Cargo feature `"async"` is enabled.
    #[cfg(feature = "async")]
    pub fn notifications(&self) -> crate::future::Notifications<'_> {
        self.notifier.notifications()
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        let slots = self.slots.lock();
        assert_eq!(slots.queue.len(), slots.index.len());
        for (position, (key, _)) in slots.queue.iter().enumerate() {
            assert_eq!(slots.index.get(key), Some(&position));
        }
    }
}

impl<K, V> ConflatingQueueBuilder<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Merge a pushed item into the queued item with the same key, instead of replacing it.
    ///
    /// `merge(existing, incoming)` is called with the queue locked and must not call back into
    /// the queue. It takes precedence over [`pool()`](Self::pool).
    pub fn merge<F>(mut self, merge: F) -> Self
    where
        F: Fn(&mut V, V) + Send + Sync + 'static,
    {
        self.merge = Some(Box::new(merge));
        self
    }

    /// Recycle replaced items into `pool` instead of dropping them.
    pub fn pool<P>(mut self, pool: Arc<P>) -> Self
    where
        P: Recycle<V> + Send + Sync + 'static,
    {
        self.pool = Some(pool);
        self
    }

    /// Preallocate room for `capacity` distinct keys.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Constructs the queue.
    #[must_use]
    pub fn build(self) -> ConflatingQueue<K, V> {
        let Self {
            key,
            merge,
            pool,
            capacity,
        } = self;
        ConflatingQueue {
            slots: Mutex::new(Slots {
                queue: VecDeque::with_capacity(capacity),
                index: HashMap::with_capacity(capacity),
            }),
            notifier: Notifier::new(),
            key,
            merge,
            pool,
        }
    }
}

impl<K, V> fmt::Debug for ConflatingQueue<K, V> {
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ds = f.debug_struct("ConflatingQueue");
        match self.slots.try_lock() {
            Some(slots) => ds.field("len", &slots.queue.len()),
            None => ds.field("len", &crate::util::Contended),
        };
        ds.field("pending", &self.notifier.is_pending())
            .finish_non_exhaustive()
    }
}

impl<K, V> fmt::Debug for ConflatingQueueBuilder<K, V> {
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConflatingQueueBuilder")
            .field("merge", &self.merge.is_some())
            .field("pool", &self.pool.is_some())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

// -------------------------------------------------------------------------------------------------
