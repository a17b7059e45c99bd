use core::fmt;

use crate::{Notified, Notifier};

/// A repeatable one-shot trigger.
///
/// While armed, the first [`try_take()`](Self::try_take) returns [`true`] and disarms it; later
/// calls return [`false`] until [`reset()`](Self::reset) arms it again.
///
/// ```
/// use conflate::Once;
///
/// let once = Once::new(true);
/// assert!(once.try_take());
/// assert!(!once.try_take());
///
/// assert!(once.reset());
/// assert!(once.try_take());
/// ```
pub struct Once {
    notifier: Notifier,
}

impl Once {
    /// Constructs a [`Once`], armed if `set` is true.
    #[must_use]
    pub const fn new(set: bool) -> Self {
        let notifier = if set {
            Notifier::armed()
        } else {
            Notifier::new()
        };
        Self { notifier }
    }

    /// Arms the trigger.
    ///
    /// Returns [`true`] if it was actually re-armed, or [`false`] if it was already armed.
    #[allow(clippy::must_use_candidate)]
    pub fn reset(&self) -> bool {
        self.notifier.notify()
    }

    /// Returns [`true`] if the action may be taken now, disarming the trigger.
    #[allow(clippy::must_use_candidate)]
    pub fn try_take(&self) -> bool {
        self.notifier.clear()
    }

    /// Returns whether the trigger is armed, without disarming it.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.notifier.is_pending()
    }

    /// Returns a future which completes when it has taken the trigger,
    /// as if by a successful [`try_take()`](Self::try_take).
    pub fn notified(&self) -> Notified<'_> {
        self.notifier.notified()
    }
}

impl Default for Once {
    /// Constructs a disarmed [`Once`].
    fn default() -> Self {
        Self::new(false)
    }
}

impl fmt::Debug for Once {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Once({:?})", self.is_armed())
    }
}
