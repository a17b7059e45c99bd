//! Multi-threaded producers and consumers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::executor::block_on;

use conflate::{ConflatingQueue, ConflatingUpdate};

// -------------------------------------------------------------------------------------------------

const PRODUCERS: u32 = 4;
const KEYS_PER_PRODUCER: u32 = 8;
const ROUNDS: u32 = 500;

/// Each key is owned by one producer which pushes increasing values for it, so a consumer must
/// see each key's values strictly increase and must eventually see the final value.
#[test]
fn queue_values_never_go_backwards() {
    let queue = ConflatingQueue::new(|&(key, _): &(u32, u32)| key);

    std::thread::scope(|scope| {
        for producer in 0..PRODUCERS {
            let queue = &queue;
            scope.spawn(move || {
                for round in 0..ROUNDS {
                    for k in 0..KEYS_PER_PRODUCER {
                        queue.push((producer * KEYS_PER_PRODUCER + k, round));
                    }
                }
            });
        }

        let consumer = scope.spawn(|| {
            let mut seen: HashMap<u32, u32> = HashMap::new();
            let total_keys = (PRODUCERS * KEYS_PER_PRODUCER) as usize;
            loop {
                block_on(queue.notified());
                while let Some((key, value)) = queue.pop() {
                    if let Some(previous) = seen.insert(key, value) {
                        assert!(value > previous, "key {key}: {value} after {previous}");
                    }
                }
                let finished = seen.len() == total_keys
                    && seen.values().all(|&value| value == ROUNDS - 1);
                if finished {
                    return seen;
                }
            }
        });

        let seen = consumer.join().unwrap();
        assert_eq!(seen.len(), (PRODUCERS * KEYS_PER_PRODUCER) as usize);
    });

    assert!(queue.is_empty());
    assert!(!queue.notifier().is_pending());
}

#[test]
fn update_merges_everything_pushed() {
    let mailbox = ConflatingUpdate::new(|pending: Option<u64>, update: u64| {
        pending.unwrap_or(0) + update
    });
    let done = AtomicBool::new(false);

    let total = std::thread::scope(|scope| {
        let consumer = scope.spawn(|| {
            let mut total = 0;
            loop {
                // Read the flag before popping so that nothing pushed before it was set
                // can be missed.
                let finished = done.load(Ordering::Acquire);
                total += mailbox.pop().unwrap_or(0);
                if finished {
                    return total;
                }
                std::thread::yield_now();
            }
        });

        std::thread::scope(|producers| {
            for _ in 0..PRODUCERS {
                producers.spawn(|| {
                    for _ in 0..ROUNDS {
                        mailbox.push(1);
                    }
                });
            }
        });
        done.store(true, Ordering::Release);

        consumer.join().unwrap()
    });

    assert_eq!(total, u64::from(PRODUCERS * ROUNDS));
}
