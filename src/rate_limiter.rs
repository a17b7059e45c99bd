use core::fmt;
use core::time::Duration;
use std::time::Instant;

use crate::lock::Mutex;

/// A token bucket governing the rate of some action.
///
/// The bucket holds up to `n` tokens and is refilled to full once per `interval`.
/// Refills are computed when the bucket is next used, so an idle `RateLimiter` costs nothing.
///
/// ```
/// use std::time::Duration;
/// use conflate::RateLimiter;
///
/// let limiter = RateLimiter::new(2, Duration::from_secs(60));
/// assert!(limiter.try_acquire());
/// assert!(limiter.try_acquire());
/// assert!(!limiter.try_acquire(), "bucket is empty until the next refill");
/// ```
pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    capacity: u32,
    interval: Duration,
}

#[derive(Debug)]
struct Bucket {
    tokens: u32,
    /// Start of the current refill period.
    refilled_at: Instant,
}

impl RateLimiter {
    /// Constructs a full [`RateLimiter`] allowing `n` actions per `interval`.
    ///
    /// `n` is raised to 1 if it is zero.
    #[must_use]
    pub fn new(n: u32, interval: Duration) -> Self {
        let capacity = n.max(1);
        Self {
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                refilled_at: Instant::now(),
            }),
            capacity,
            interval,
        }
    }

    /// Takes a token if one is available. Never blocks.
    #[allow(clippy::must_use_candidate)]
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now()).is_ok()
    }

    /// Blocks the current thread until a token is available, and takes it.
    pub fn acquire(&self) {
        loop {
            match self.try_acquire_at(Instant::now()) {
                Ok(()) => return,
                Err(Some(next_refill)) => {
                    std::thread::sleep(next_refill.saturating_duration_since(Instant::now()));
                }
                Err(None) => std::thread::sleep(self.interval),
            }
        }
    }

    /// Returns the time of the next refill if no token is available, or [`None`] if that time
    /// is beyond any representable [`Instant`].
    fn try_acquire_at(&self, now: Instant) -> Result<(), Option<Instant>> {
        let mut bucket = self.bucket.lock();

        let elapsed = now.saturating_duration_since(bucket.refilled_at);
        if elapsed >= self.interval {
            // Keep refills aligned to period boundaries rather than to the time of use.
            let periods = elapsed
                .as_nanos()
                .checked_div(self.interval.as_nanos())
                .unwrap_or(0);
            let advance = u32::try_from(periods)
                .ok()
                .and_then(|periods| self.interval.checked_mul(periods))
                .unwrap_or(elapsed);
            bucket.refilled_at += advance;
            bucket.tokens = self.capacity;
            tracing::debug!(tokens = self.capacity, "rate limiter refilled");
        }

        if bucket.tokens > 0 {
            bucket.tokens -= 1;
            Ok(())
        } else {
            Err(bucket.refilled_at.checked_add(self.interval))
        }
    }
}

impl fmt::Debug for RateLimiter {
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ds = f.debug_struct("RateLimiter");
        match self.bucket.try_lock() {
            Some(bucket) => ds.field("tokens", &bucket.tokens),
            None => ds.field("tokens", &crate::util::Contended),
        };
        ds.field("capacity", &self.capacity)
            .field("interval", &self.interval)
            .finish()
    }
}
