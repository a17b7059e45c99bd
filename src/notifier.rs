use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::{AtomicBool, Ordering};
use core::task::{Context, Poll, Waker};

use crate::lock::Mutex;

// -------------------------------------------------------------------------------------------------

/// An edge-triggered, single-slot signal.
///
/// A `Notifier` is either *pending* or *absent*. [`notify()`](Self::notify) moves it from absent
/// to pending and [`clear()`](Self::clear) moves it back. Signals coalesce: notifying an already
/// pending `Notifier` does nothing, so at most one signal is ever outstanding no matter how
/// many producers call `notify()` before a consumer gets around to `clear()`.
///
/// Neither operation ever blocks or fails; each only reports whether the attempted
/// transition happened.
///
/// To suspend until a signal arrives, await [`notified()`](Self::notified). The returned future
/// can be combined with other futures (timeouts, cancellation) in any `select`-style construct.
///
/// Every conflating container in this crate owns one `Notifier` and drives it while holding its
/// own lock, so a pending signal always corresponds to observable pending data.
///
/// ```
/// use conflate::Notifier;
///
/// let n = Notifier::new();
/// assert!(n.notify());
/// assert!(!n.notify()); // already pending
/// assert!(n.clear());
/// assert!(!n.clear()); // nothing left to consume
/// ```
pub struct Notifier {
    signal: AtomicBool,

    /// Wakers of [`Notified`] futures which found the signal absent.
    /// Drained and woken on every absent-to-pending transition.
    waiters: Mutex<Vec<Waker>>,
}

impl Notifier {
    const SET_ORDERING: Ordering = Ordering::Release;
    const GET_CLEAR_ORDERING: Ordering = Ordering::Acquire;

    /// Constructs a [`Notifier`] with no pending signal.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_state(false)
    }

    /// Constructs a [`Notifier`] whose signal is already pending.
    ///
    /// ```
    /// let n = conflate::Notifier::armed();
    /// assert!(n.is_pending());
    /// assert!(!n.notify());
    /// ```
    #[must_use]
    pub const fn armed() -> Self {
        Self::with_state(true)
    }

    const fn with_state(pending: bool) -> Self {
        Self {
            signal: AtomicBool::new(pending),
            waiters: Mutex::new(Vec::new()),
        }
    }

    /// Makes the signal pending.
    ///
    /// Returns [`true`] if this call caused the transition from absent to pending, and
    /// [`false`] if a signal was already pending, in which case nothing happens.
    ///
    /// On a transition, every task suspended in [`notified()`](Self::notified) is woken,
    /// before this returns and on this thread.
    #[allow(clippy::must_use_candidate)]
    pub fn notify(&self) -> bool {
        let transitioned = self
            .signal
            .compare_exchange(false, true, Self::SET_ORDERING, Ordering::Relaxed)
            .is_ok();
        if transitioned {
            self.wake_waiters();
        }
        transitioned
    }

    /// Consumes the pending signal.
    ///
    /// Returns [`true`] if a signal was consumed, and [`false`] if none was pending.
    #[allow(clippy::must_use_candidate)]
    #[inline]
    pub fn clear(&self) -> bool {
        self.signal
            .compare_exchange(true, false, Self::GET_CLEAR_ORDERING, Ordering::Relaxed)
            .is_ok()
    }

    /// Returns whether a signal is pending, without consuming it.
    #[must_use]
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.signal.load(Self::GET_CLEAR_ORDERING)
    }

    /// Returns a future which completes when it consumes a signal.
    ///
    /// The signal is consumed exactly as if by [`clear()`](Self::clear), and only at the moment
    /// the future completes. Dropping the future earlier has no effect on the `Notifier`.
    ///
    /// Any number of these futures may be waiting at once. All of them are woken when a signal
    /// arrives; one consumes it and the others keep waiting.
    ///
    /// # Caution!
    ///
    /// * Wakers are invoked from inside [`notify()`](Self::notify). The containers in this crate
    ///   call `notify()` with their lock held, so a waker which polls its task inline and
    ///   re-enters the same container will deadlock. Ordinary executors only schedule the task.
    ///
    /// ```
    /// use conflate::Notifier;
    /// use futures::executor::block_on;
    ///
    /// let n = Notifier::new();
    /// n.notify();
    /// block_on(n.notified());
    /// assert!(!n.is_pending());
    /// ```
    pub fn notified(&self) -> Notified<'_> {
        Notified {
            notifier: self,
            done: false,
        }
    }

    /// Attempts to consume a signal, registering `cx`’s waker if none is pending.
    ///
    /// This is the polling form of [`notified()`](Self::notified), for use in hand-written
    /// [`Future`] or stream implementations.
    pub fn poll_notified(&self, cx: &mut Context<'_>) -> Poll<()> {
        if self.clear() {
            return Poll::Ready(());
        }
        self.register(cx.waker());
        // The signal may have been set between the first check and registration.
        if self.clear() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }

    fn register(&self, waker: &Waker) {
        let mut waiters = self.waiters.lock();
        if !waiters.iter().any(|w| w.will_wake(waker)) {
            waiters.push(waker.clone());
        }
    }

    fn wake_waiters(&self) {
        let waiters = core::mem::take(&mut *self.waiters.lock());
        for waker in waiters {
            waker.wake();
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never multiline
        write!(f, "Notifier({:?})", self.signal.load(Ordering::Relaxed))
    }
}

// -------------------------------------------------------------------------------------------------

/// Future returned by [`Notifier::notified()`].
///
/// Completes with `()` once it has consumed a pending signal.
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct Notified<'a> {
    pub(crate) notifier: &'a Notifier,
    pub(crate) done: bool,
}

impl Future for Notified<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        assert!(!self.done, "Notified polled after completion");
        let poll_outcome = self.notifier.poll_notified(cx);
        if poll_outcome.is_ready() {
            self.get_mut().done = true;
        }
        poll_outcome
    }
}

// -------------------------------------------------------------------------------------------------
