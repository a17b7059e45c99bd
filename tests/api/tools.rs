use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Wake, Waker};

use futures::task::LocalSpawnExt as _;

// -------------------------------------------------------------------------------------------------

/// A price quote keyed by its symbol.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Quote {
    pub symbol: String,
    pub price: u32,
}

impl Quote {
    pub(crate) fn new(symbol: &str, price: u32) -> Self {
        Self {
            symbol: symbol.to_owned(),
            price,
        }
    }

    pub(crate) fn symbol(&self) -> String {
        self.symbol.clone()
    }
}

/// An order instruction whose fields arrive piecemeal.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Instruction {
    pub id: &'static str,
    pub qty: Option<f64>,
    pub px: Option<f64>,
}

// -------------------------------------------------------------------------------------------------

/// A [`Waker`] which counts how many times it has been woken.
#[derive(Debug, Default)]
pub(crate) struct CountingWaker(AtomicUsize);

impl CountingWaker {
    pub(crate) fn new() -> (Arc<Self>, Waker) {
        let counter = Arc::new(Self::default());
        let waker = Waker::from(Arc::clone(&counter));
        (counter, waker)
    }

    pub(crate) fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl Wake for CountingWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) async fn yield_now() {
    let mut yielded = false;
    core::future::poll_fn(move |ctx| {
        if yielded {
            core::task::Poll::Ready(())
        } else {
            yielded = true;
            ctx.waker().wake_by_ref();
            core::task::Poll::Pending
        }
    })
    .await
}

/// Run a future to completion, but don't block if it doesn't wake, under the assumption that
/// that indicates a lost-signal bug.
pub(crate) fn run_task_without_waiting(future: impl Future<Output = ()> + 'static) {
    let mut executor = futures::executor::LocalPool::new();
    executor.spawner().spawn_local(future).unwrap();
    assert!(executor.try_run_one(), "Test stalled");
}
