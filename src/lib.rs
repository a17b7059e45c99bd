//! Conflating containers: concurrency-safe queues and mailboxes that keep only the latest
//! value per key.
//!
//! # What `conflate` does
//!
//! The niche which `conflate` seeks to fill is bridging producers that emit updates faster than a
//! consumer can process them, when intermediate values are disposable. Price ticks and order
//! instructions are typical: only the most recent state of each instrument or order matters,
//! but the consumer should still see distinct keys in the order they arrived, so that a busy
//! key cannot starve a quiet one.
//!
//! In exchange for discarding history, conflation offers
//!
//! * memory bounded by the number of distinct keys rather than by the arrival rate,
//! * producers which never block beyond a brief critical section, and
//! * at most one pending wake-up for the consumer, however many updates arrived.
//!
//! # Getting started
//!
//! * [`ConflatingQueue`] is a queue with at most one entry per key. Pushing an existing key
//!   updates its entry in place (by replacement, by a merge function, or by replacement with
//!   the old item recycled into a [`Pool`]) without changing its position.
//!
//! * [`ConflatingUpdate`] is a single slot into which every pushed update is merged,
//!   for consumers which want to assess all recent events at once.
//!
//! * [`Notifier`] is the edge-triggered signal that both containers use to wake consumers.
//!   Await a container’s `notified()` future (alongside timeouts or cancellation, in any
//!   `select`) and then pop until the container is empty.
//!
//! ```
//! use conflate::ConflatingQueue;
//!
//! let queue = ConflatingQueue::new(|&(symbol, _): &(char, u32)| symbol);
//! queue.push(('A', 1));
//! queue.push(('B', 2));
//! queue.push(('A', 3));
//!
//! futures::executor::block_on(async {
//!     queue.notified().await;
//!     assert_eq!(queue.pop(), Some(('A', 3)));
//!     queue.notified().await;
//!     assert_eq!(queue.pop(), Some(('B', 2)));
//! });
//! assert_eq!(queue.pop(), None);
//! ```
//!
//! A few smaller utilities built in the same manner are also provided:
//! [`Once`], a repeatable one-shot trigger; [`Completion`], a completion signal with a deadline;
//! [`RateLimiter`], a token bucket; and [`TtlCache`], a read-through cache with expiry.
//!
//! # Features
//!
//! The following Cargo feature flags are defined:
//!
//! * `"async"`:
//!   Add `Stream` adapters for notifications, in the
#![cfg_attr(feature = "async", doc = "[`future`]")]
#![cfg_attr(not(feature = "async"), doc = "`future`")]
//!   module, and make [`Notified`] a `FusedFuture`.
//!
//! # Logging
//!
//! `conflate` emits [`tracing`] events at `trace` and `debug` level and never installs a
//! subscriber.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(explicit_outlives_requirements)]
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(redundant_lifetimes)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unnameable_types)]
#![warn(unused_extern_crates)]
#![warn(unused_lifetimes)]
#![warn(unreachable_pub)]
#![warn(clippy::assigning_clones)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::exhaustive_enums)]
#![warn(clippy::exhaustive_structs)]
#![warn(clippy::inconsistent_struct_constructor)]
#![warn(clippy::large_futures)]
#![warn(clippy::manual_let_else)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::module_name_repetitions)]
#![warn(clippy::pedantic)]
#![warn(clippy::return_self_not_must_use)]
#![warn(clippy::should_panic_without_expect)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::unnecessary_wraps)]
#![allow(clippy::bool_assert_comparison, reason = "less legible")]
#![allow(clippy::semicolon_if_nothing_returned, reason = "explicit delegation")]

// -------------------------------------------------------------------------------------------------

mod cache;
pub use cache::TtlCache;

mod completion;
pub use completion::{Completion, TimeoutError};

#[cfg(feature = "async")]
pub mod future;

mod lock;

mod notifier;
pub use notifier::{Notified, Notifier};

mod once;
pub use once::Once;

mod pool;
pub use pool::{Pool, Recycle};

mod queue;
pub use queue::{ConflatingQueue, ConflatingQueueBuilder};

mod rate_limiter;
pub use rate_limiter::RateLimiter;

mod update;
pub use update::ConflatingUpdate;

mod util;
