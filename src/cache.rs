use core::fmt;
use core::hash::Hash;
use core::time::Duration;
use std::collections::HashMap;
use std::time::Instant;

/// An in-memory read-through cache whose entries expire after a fixed time-to-live.
///
/// Looking up a key that is absent or older than the time-to-live loads it through the
/// `replace` function given at construction, for example from a database.
///
/// `TtlCache` is not internally synchronized; wrap it in a lock to share it.
///
/// ```
/// use std::time::Duration;
/// use conflate::TtlCache;
///
/// let mut loads = 0;
/// let mut cache = TtlCache::new(Duration::from_secs(60), move |key: &u32| {
///     loads += 1;
///     Some(format!("value {key} (load {loads})"))
/// });
///
/// assert_eq!(cache.get(&7).map(String::as_str), Some("value 7 (load 1)"));
/// assert_eq!(cache.get(&7).map(String::as_str), Some("value 7 (load 1)"));
/// ```
pub struct TtlCache<K, V> {
    entries: HashMap<K, Entry<V>>,
    ttl: Duration,
    replace: Box<dyn FnMut(&K) -> Option<V> + Send>,
}

struct Entry<V> {
    value: V,
    inserted: Instant,
}

impl<K: Eq + Hash + Clone, V> TtlCache<K, V> {
    /// Constructs an empty cache.
    ///
    /// `replace(key)` should return the current value for `key`, or [`None`] if it does not exist.
    pub fn new<F>(ttl: Duration, replace: F) -> Self
    where
        F: FnMut(&K) -> Option<V> + Send + 'static,
    {
        Self {
            entries: HashMap::new(),
            ttl,
            replace: Box::new(replace),
        }
    }

    /// Returns the value for `key`, reloading it if it is absent or expired.
    ///
    /// If reloading finds nothing, returns [`None`]; an expired entry is never returned.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let fresh = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.inserted.elapsed() <= self.ttl);
        if !fresh {
            let value = (self.replace)(key)?;
            tracing::trace!("cache entry reloaded");
            self.entries.insert(
                key.clone(),
                Entry {
                    value,
                    inserted: Instant::now(),
                },
            );
        }
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Discards the entry for `key`, so that the next [`get()`](Self::get) reloads it.
    pub fn invalidate(&mut self, key: &K) {
        self.entries.remove(key);
    }

    /// Returns the number of entries held, including expired ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> fmt::Debug for TtlCache<K, V> {
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("len", &self.entries.len())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
