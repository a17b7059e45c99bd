//! Integration with `futures` stream combinators.
//!
//! This module is only available if the Cargo feature `"async"` is enabled.

use core::pin::Pin;
use core::task::{Context, Poll};

use futures_core::{FusedFuture, FusedStream, Stream};

use crate::{Notified, Notifier};

// -------------------------------------------------------------------------------------------------

/// A [`Stream`] which yields `()` each time it consumes a signal from a [`Notifier`].
///
/// Obtain one from [`Notifier::notifications()`] or from a container’s `notifications()`
/// method. The stream never ends; it is intended for consumer loops that would otherwise be
/// written around repeated [`Notifier::notified()`] calls.
///
/// ```
/// use conflate::ConflatingQueue;
/// use futures::StreamExt as _;
///
/// let queue = ConflatingQueue::new(|&(symbol, _): &(char, u32)| symbol);
/// queue.push(('A', 1));
/// queue.push(('B', 2));
/// queue.push(('A', 3));
///
/// futures::executor::block_on(async {
///     let mut wakeups = queue.notifications();
///     let mut popped = Vec::new();
///     while popped.len() < 2 {
///         wakeups.next().await;
///         popped.extend(queue.pop());
///     }
///     assert_eq!(popped, [('A', 3), ('B', 2)]);
/// });
/// ```
#[derive(Debug)]
#[must_use = "streams do nothing unless polled"]
pub struct Notifications<'a> {
    notifier: &'a Notifier,
}

impl Notifier {
    /// Returns a [`Stream`] which yields once per consumed signal.
    ///
    /// This method is only available if the Cargo feature `"async"` is enabled.
    pub fn notifications(&self) -> Notifications<'_> {
        Notifications { notifier: self }
    }
}

impl Stream for Notifications<'_> {
    type Item = ();

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.notifier.poll_notified(cx).map(Some)
    }
}

impl FusedStream for Notifications<'_> {
    fn is_terminated(&self) -> bool {
        false
    }
}

/// Allows [`Notified`] to be used directly in `futures::select!`.
impl FusedFuture for Notified<'_> {
    fn is_terminated(&self) -> bool {
        self.done
    }
}
