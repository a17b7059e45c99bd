use core::fmt;
use core::time::Duration;
use std::time::Instant;

use crate::lock::{Condvar, Mutex};

/// Error returned by [`Completion::wait()`] when the deadline passes first.
#[expect(clippy::exhaustive_structs)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("timed out waiting for completion")]
pub struct TimeoutError;

/// A completion signal with a deadline.
///
/// One party calls [`done()`](Self::done) to report success; another calls
/// [`wait()`](Self::wait) to block until that happens or the deadline, fixed when the
/// `Completion` is constructed, passes.
///
/// A `Completion` is spent by its first successful `wait()`: every later `wait()` fails
/// immediately.
///
/// ```
/// use std::time::Duration;
/// use conflate::{Completion, TimeoutError};
///
/// let completion = Completion::with_timeout(Duration::from_secs(60));
/// completion.done();
/// completion.done(); // no further effect
/// assert_eq!(completion.wait(), Ok(()));
/// assert_eq!(completion.wait(), Err(TimeoutError));
/// ```
pub struct Completion {
    state: Mutex<State>,
    condvar: Condvar,
    /// [`None`] if the timeout reaches past any representable instant.
    deadline: Option<Instant>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Waiting,
    Done,
    Spent,
}

impl Completion {
    /// Constructs a [`Completion`] whose deadline is `timeout` from now.
    ///
    /// A `timeout` too long to represent as an [`Instant`], such as [`Duration::MAX`],
    /// means there is no deadline.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            state: Mutex::new(State::Waiting),
            condvar: Condvar::new(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Signals success, waking the waiter if there is one.
    ///
    /// Calls after the first, and calls after the `Completion` is spent, have no effect.
    pub fn done(&self) {
        let mut state = self.state.lock();
        if *state == State::Waiting {
            *state = State::Done;
            self.condvar.notify_all();
        }
    }

    /// Blocks the current thread until [`done()`](Self::done) is called or the deadline passes.
    ///
    /// # Errors
    ///
    /// Returns [`TimeoutError`] if the deadline passed first, or if a previous `wait()` already
    /// succeeded.
    pub fn wait(&self) -> Result<(), TimeoutError> {
        let mut state = self.state.lock();
        loop {
            match *state {
                State::Done => {
                    *state = State::Spent;
                    return Ok(());
                }
                State::Spent => return Err(TimeoutError),
                State::Waiting => {}
            }

            // Spurious wakeups and timeouts both go around the loop to re-check the state.
            let Some(deadline) = self.deadline else {
                state = self.condvar.wait(state);
                continue;
            };
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::debug!("completion deadline passed");
                return Err(TimeoutError);
            }
            (state, _) = self.condvar.wait_timeout(state, remaining);
        }
    }
}

impl fmt::Debug for Completion {
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ds = f.debug_struct("Completion");
        match self.state.try_lock() {
            Some(state) => ds.field("state", &*state),
            None => ds.field("state", &crate::util::Contended),
        };
        ds.field("deadline", &self.deadline).finish()
    }
}
