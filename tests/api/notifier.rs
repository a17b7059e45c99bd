use core::future::Future as _;
use core::pin::pin;
use core::task::{Context, Poll};

use futures::future::{self, Either};
use futures::task::noop_waker_ref;
use futures::FutureExt as _;

use conflate::Notifier;

use crate::tools::{run_task_without_waiting, CountingWaker};

// -------------------------------------------------------------------------------------------------

#[test]
fn notify_twice_then_clear_twice() {
    let n = Notifier::new();
    assert_eq!(n.notify(), true);
    assert_eq!(n.notify(), false);
    assert_eq!(n.clear(), true);
    assert_eq!(n.clear(), false);
}

#[test]
fn armed_starts_pending() {
    let n = Notifier::armed();
    assert_eq!(n.notify(), false);
    assert_eq!(n.clear(), true);
    assert_eq!(n.clear(), false);
}

#[test]
fn debug() {
    let n = Notifier::default();
    assert_eq!(format!("{n:?}"), "Notifier(false)");
    n.notify();
    assert_eq!(format!("{n:#?}"), "Notifier(true)");
}

/// Basic functionality test using only `poll()` and ignoring wakers.
#[test]
fn notified_polling() {
    let ctx = &mut Context::from_waker(noop_waker_ref());
    let n = Notifier::armed();

    // First poll succeeds immediately because we started armed, and consumes the signal.
    assert_eq!(pin!(n.notified()).as_mut().poll(ctx), Poll::Ready(()));
    assert!(!n.is_pending());

    let mut future = pin!(n.notified());
    assert_eq!(future.as_mut().poll(ctx), Poll::Pending);
    n.notify();
    assert_eq!(future.as_mut().poll(ctx), Poll::Ready(()));
    assert!(!n.is_pending());
}

#[test]
fn dropping_notified_keeps_signal() {
    let ctx = &mut Context::from_waker(noop_waker_ref());
    let n = Notifier::new();
    {
        let mut future = pin!(n.notified());
        assert_eq!(future.as_mut().poll(ctx), Poll::Pending);
        n.notify();
        // dropped without being polled again
    }
    assert!(n.is_pending());
}

#[test]
fn all_waiters_are_woken_and_one_consumes() {
    let n = Notifier::new();
    let (count_1, waker_1) = CountingWaker::new();
    let (count_2, waker_2) = CountingWaker::new();
    let ctx_1 = &mut Context::from_waker(&waker_1);
    let ctx_2 = &mut Context::from_waker(&waker_2);

    let mut future_1 = pin!(n.notified());
    let mut future_2 = pin!(n.notified());
    assert_eq!(future_1.as_mut().poll(ctx_1), Poll::Pending);
    assert_eq!(future_2.as_mut().poll(ctx_2), Poll::Pending);

    assert!(n.notify());
    assert_eq!((count_1.count(), count_2.count()), (1, 1));

    // Only one of them gets the signal; the other goes back to waiting.
    assert_eq!(future_1.as_mut().poll(ctx_1), Poll::Ready(()));
    assert_eq!(future_2.as_mut().poll(ctx_2), Poll::Pending);

    assert!(n.notify());
    assert_eq!(count_2.count(), 2);
    // A redundant notify wakes no one.
    assert!(!n.notify());
    assert_eq!(count_2.count(), 2);
    assert_eq!(future_2.as_mut().poll(ctx_2), Poll::Ready(()));
}

#[test]
fn selects_against_cancellation() {
    let n = Notifier::new();

    // Cancellation wins while nothing is pending.
    let outcome = future::select(n.notified(), future::ready("cancelled")).now_or_never();
    assert!(matches!(outcome, Some(Either::Right(("cancelled", _)))));
    assert!(!n.is_pending());

    // Once pending, the notification is ready too; select prefers the first.
    n.notify();
    let outcome = future::select(n.notified(), future::pending::<()>()).now_or_never();
    assert!(matches!(outcome, Some(Either::Left(((), _)))));
    assert!(!n.is_pending());
}

#[test]
fn wakes_task_across_join() {
    let n: &'static Notifier = Box::leak(Box::new(Notifier::new()));
    run_task_without_waiting(async move {
        futures::join!(
            async {
                n.notified().await;
                n.notified().await;
            },
            async {
                n.notify();
                crate::tools::yield_now().await;
                n.notify();
            },
        );
    });
    assert!(!n.is_pending());
}
