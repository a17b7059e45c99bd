use core::fmt;

use crate::lock::{Mutex, MutexGuard};
use crate::{Notified, Notifier};

// -------------------------------------------------------------------------------------------------

/// A single-slot mailbox which merges every pushed update into one pending value.
///
/// `T` is typically a struct of optional fields, each update carrying one or more new data points.
/// A consumer which wants to assess all contemporaneous events at once, rather than in sequence,
/// pops the merged value whenever it is ready.
///
/// ```
/// use conflate::ConflatingUpdate;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Update { a: Option<i64>, b: Option<&'static str> }
///
/// let mailbox = ConflatingUpdate::new(|pending: Option<Update>, update: Update| {
///     let Some(mut pending) = pending else { return update };
///     pending.a = update.a.or(pending.a);
///     pending.b = update.b.or(pending.b);
///     pending
/// });
///
/// mailbox.push(Update { a: Some(42), b: None });
/// mailbox.push(Update { a: Some(43), b: Some("b") });
///
/// assert_eq!(mailbox.pop(), Some(Update { a: Some(43), b: Some("b") }));
/// assert_eq!(mailbox.pop(), None);
/// ```
///
/// The owned [`Notifier`] is pending exactly while an update is pending.
pub struct ConflatingUpdate<T> {
    pending: Mutex<Option<T>>,
    notifier: Notifier,
    merge: Box<dyn Fn(Option<T>, T) -> T + Send + Sync>,
}

impl<T> ConflatingUpdate<T> {
    /// Constructs an empty mailbox.
    ///
    /// `merge(pending, update)` returns the new pending value. `pending` is [`None`] when nothing
    /// is pending, in which case `merge` would usually return `update` unchanged.
    /// It is called with the mailbox locked and must not call back into it.
    pub fn new<F>(merge: F) -> Self
    where
        F: Fn(Option<T>, T) -> T + Send + Sync + 'static,
    {
        Self {
            pending: Mutex::new(None),
            notifier: Notifier::new(),
            merge: Box::new(merge),
        }
    }

    /// Constructs an empty mailbox in which each update replaces any pending one.
    #[must_use]
    pub fn latest() -> Self
    where
        T: 'static,
    {
        Self::new(|_, update| update)
    }

    /// Merges `update` into the pending value and makes the signal pending.
    ///
    /// # Panics
    ///
    /// If the merge function panics, the panic propagates and the previously pending value is
    /// lost. The mailbox is then empty and its signal is cleared to match.
    pub fn push(&self, update: T) {
        let mut slot = ClearIfEmpty {
            pending: self.pending.lock(),
            notifier: &self.notifier,
        };
        let merged = (self.merge)(slot.pending.take(), update);
        *slot.pending = Some(merged);
        self.notifier.notify();
    }

    /// Takes the pending value, leaving nothing pending, and clears the signal.
    ///
    /// Returns [`None`] if nothing was pending.
    #[must_use]
    pub fn pop(&self) -> Option<T> {
        let mut pending = self.pending.lock();
        let result = pending.take();
        self.notifier.clear();
        result
    }

    /// Returns whether a value is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    /// Returns the mailbox’s [`Notifier`], which is pending while a value is pending.
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Returns a future which completes when a value has become pending.
    ///
    /// This is equivalent to `self.notifier().notified()`.
    pub fn notified(&self) -> Notified<'_> {
        self.notifier.notified()
    }

    /// Returns a stream which yields each time a value becomes pending.
    ///
    /// This method is only available if the Cargo feature `"async"` is enabled.
    #[cfg(feature = "async")]
    pub fn notifications(&self) -> crate::future::Notifications<'_> {
        self.notifier.notifications()
    }
}

/// Holds the mailbox locked, and on drop clears the signal if nothing is pending,
/// so that an unwinding merge cannot leave a signal without a value.
struct ClearIfEmpty<'a, T> {
    pending: MutexGuard<'a, Option<T>>,
    notifier: &'a Notifier,
}

impl<T> Drop for ClearIfEmpty<'_, T> {
    fn drop(&mut self) {
        if self.pending.is_none() {
            self.notifier.clear();
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ConflatingUpdate<T> {
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ds = f.debug_struct("ConflatingUpdate");
        match self.pending.try_lock() {
            Some(pending) => ds.field("pending", &*pending),
            None => ds.field("pending", &crate::util::Contended),
        };
        ds.finish_non_exhaustive()
    }
}
