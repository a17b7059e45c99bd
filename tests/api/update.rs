use std::panic::{catch_unwind, AssertUnwindSafe};

use futures::FutureExt as _;
use pretty_assertions::assert_eq;

use conflate::ConflatingUpdate;

// -------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
struct Update {
    a: Option<i64>,
    b: Option<String>,
}

fn fields_override() -> ConflatingUpdate<Update> {
    ConflatingUpdate::new(|pending: Option<Update>, update: Update| {
        let Some(mut pending) = pending else {
            return update;
        };
        if update.a.is_some() {
            pending.a = update.a;
        }
        if update.b.is_some() {
            pending.b = update.b;
        }
        pending
    })
}

#[test]
fn non_empty_fields_override() {
    let mailbox = fields_override();

    let mut upd = Update {
        a: Some(42),
        ..Update::default()
    };
    mailbox.push(upd.clone());

    upd.a = Some(43);
    upd.b = Some("b".to_owned());
    mailbox.push(upd);

    assert_eq!(
        mailbox.pop(),
        Some(Update {
            a: Some(43),
            b: Some("b".to_owned()),
        })
    );
    assert_eq!(mailbox.pop(), None);
}

#[test]
fn earlier_fields_survive_later_partial_updates() {
    let mailbox = fields_override();
    mailbox.push(Update {
        a: Some(1),
        b: Some("first".to_owned()),
    });
    mailbox.push(Update {
        a: Some(2),
        b: None,
    });
    assert_eq!(
        mailbox.pop(),
        Some(Update {
            a: Some(2),
            b: Some("first".to_owned()),
        })
    );
}

#[test]
fn pop_on_empty_is_a_no_op() {
    let mailbox = fields_override();
    assert_eq!(mailbox.pop(), None);
    assert!(!mailbox.is_pending());
    assert_eq!(mailbox.notified().now_or_never(), None);
}

#[test]
fn notification_fires_once_per_pending_transition() {
    let mailbox = ConflatingUpdate::<u32>::latest();
    mailbox.push(1);
    mailbox.push(2);
    mailbox.push(3);
    assert_eq!(mailbox.notified().now_or_never(), Some(()));
    assert_eq!(mailbox.notified().now_or_never(), None);
    assert_eq!(mailbox.pop(), Some(3));

    mailbox.push(4);
    assert_eq!(mailbox.notified().now_or_never(), Some(()));
    assert_eq!(mailbox.pop(), Some(4));
}

#[test]
fn panicking_merge_leaves_no_stray_signal() {
    let mailbox = ConflatingUpdate::new(|pending: Option<u32>, update: u32| {
        assert_ne!(update, 99, "rejected update");
        pending.unwrap_or(0) + update
    });
    mailbox.push(1);

    let outcome = catch_unwind(AssertUnwindSafe(|| mailbox.push(99)));
    assert!(outcome.is_err());

    assert!(!mailbox.is_pending());
    assert!(!mailbox.notifier().is_pending(), "signal matches the empty slot");
    assert_eq!(mailbox.pop(), None);

    mailbox.push(2);
    assert!(mailbox.notifier().is_pending());
    assert_eq!(mailbox.pop(), Some(2));
}

#[test]
fn debug() {
    let mailbox = ConflatingUpdate::<u32>::latest();
    mailbox.push(7);
    assert_eq!(format!("{mailbox:?}"), "ConflatingUpdate { pending: Some(7), .. }");
}
