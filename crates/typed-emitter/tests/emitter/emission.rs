//! Emission semantics: snapshot rules, re-entrancy and panic propagation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use typed_emitter::{Emitter, Listener};

use super::common::*;

// ============================================================================
// Mutation during emit
// ============================================================================

#[test]
fn listener_added_during_emit_is_not_called_in_current_emission() {
    let emitter: Arc<Emitter<Hitchhiker>> = Arc::new(Emitter::new());
    let log = make_log();

    // First listener: during its call, it adds a second listener.
    {
        let emitter_clone = Arc::clone(&emitter);
        let log_clone = Arc::clone(&log);

        emitter.listen::<MeaningOfLife>(move |_| {
            push(&log_clone, "first");
            let log2 = Arc::clone(&log_clone);
            emitter_clone.listen::<MeaningOfLife>(move |_| push(&log2, "second"));
        });
    }

    emitter.emit::<MeaningOfLife>((1,));
    assert_eq!(entries(&log), vec!["first"]);

    // The listener added last round fires from the next emission on.
    log.lock().unwrap().clear();
    emitter.emit::<MeaningOfLife>((2,));
    assert_eq!(entries(&log), vec!["first", "second"]);
}

#[test]
fn listener_removed_before_its_turn_is_skipped() {
    let emitter: Arc<Emitter<Hitchhiker>> = Arc::new(Emitter::new());
    let log = make_log();

    let second = {
        let log = Arc::clone(&log);
        Listener::new(move |_: &(u32,)| push(&log, "second"))
    };

    // First listener removes the second before it gets its turn.
    {
        let emitter_clone = Arc::clone(&emitter);
        let second = second.clone();
        let log = Arc::clone(&log);
        emitter.listen::<MeaningOfLife>(move |_| {
            push(&log, "first");
            emitter_clone.off::<MeaningOfLife>(&second);
        });
    }
    emitter.on::<MeaningOfLife>(&second);

    emitter.emit::<MeaningOfLife>((1,));

    assert_eq!(entries(&log), vec!["first"]);
    assert!(!emitter.is_subscribed::<MeaningOfLife>(&second));
}

#[test]
fn listener_removed_after_its_turn_was_still_called() {
    let emitter: Arc<Emitter<Hitchhiker>> = Arc::new(Emitter::new());
    let first_calls = Arc::new(AtomicUsize::new(0));

    let first = {
        let calls = Arc::clone(&first_calls);
        Listener::new(move |_: &(u32,)| {
            calls.fetch_add(1, Ordering::SeqCst);
        })
    };
    emitter.on::<MeaningOfLife>(&first);

    // Second listener removes the first during emission.
    {
        let emitter_clone = Arc::clone(&emitter);
        let first = first.clone();
        emitter.listen::<MeaningOfLife>(move |_| emitter_clone.off::<MeaningOfLife>(&first));
    }

    emitter.emit::<MeaningOfLife>((1,));
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);

    // But the first listener is now removed — the next emit skips it.
    emitter.emit::<MeaningOfLife>((2,));
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn listener_can_unsubscribe_itself() {
    let emitter: Arc<Emitter<Hitchhiker>> = Arc::new(Emitter::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let slot: Arc<std::sync::Mutex<Option<Listener<()>>>> = Arc::default();

    let listener = {
        let emitter = Arc::clone(&emitter);
        let calls = Arc::clone(&calls);
        let slot = Arc::clone(&slot);
        Listener::new(move |_: &()| {
            calls.fetch_add(1, Ordering::SeqCst);
            if let Some(me) = slot.lock().unwrap().take() {
                emitter.off::<Beep>(&me);
            }
        })
    };
    *slot.lock().unwrap() = Some(listener.clone());
    emitter.on::<Beep>(&listener);

    emitter.emit::<Beep>(());
    emitter.emit::<Beep>(());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!emitter.has_listeners::<Beep>());
}

// ============================================================================
// Re-entrancy
// ============================================================================

#[test]
fn nested_emit_of_another_event_runs_inline() {
    let emitter: Arc<Emitter<Hitchhiker>> = Arc::new(Emitter::new());
    let log = make_log();

    {
        let log = Arc::clone(&log);
        emitter.listen::<Beep>(move |_| push(&log, "beep"));
    }
    {
        let emitter_clone = Arc::clone(&emitter);
        let log = Arc::clone(&log);
        emitter.listen::<Towel>(move |(packed,)| {
            push(&log, format!("towel:{packed}"));
            emitter_clone.emit::<Beep>(());
            push(&log, "towel done");
        });
    }

    emitter.emit::<Towel>((true,));

    assert_eq!(entries(&log), vec!["towel:true", "beep", "towel done"]);
}

#[test]
fn nested_emit_of_same_event_does_not_deadlock() {
    let emitter: Arc<Emitter<Hitchhiker>> = Arc::new(Emitter::new());
    let log = make_log();

    {
        let emitter_clone = Arc::clone(&emitter);
        let log = Arc::clone(&log);
        emitter.listen::<MeaningOfLife>(move |(n,)| {
            push(&log, format!("{n}"));
            if *n > 0 {
                emitter_clone.emit::<MeaningOfLife>((n - 1,));
            }
        });
    }

    emitter.emit::<MeaningOfLife>((3,));

    assert_eq!(entries(&log), vec!["3", "2", "1", "0"]);
}

// ============================================================================
// Error isolation — emit does NOT catch panics
// ============================================================================

#[test]
fn panicking_listener_propagates_and_prevents_subsequent_calls() {
    let emitter: Emitter<Hitchhiker> = Emitter::new();
    let log = make_log();
    let log_clone = Arc::clone(&log);

    emitter.listen::<Beep>(|_| panic!("first panics"));
    emitter.listen::<Beep>(move |_| push(&log_clone, "second"));

    // The panic from the first listener should propagate out of emit().
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        emitter.emit::<Beep>(());
    }));

    assert!(result.is_err(), "emit should propagate panics from listeners");
    assert!(
        entries(&log).is_empty(),
        "second listener should not be called after first panics"
    );
}

#[test]
fn panic_payload_reaches_the_caller_unchanged() {
    let emitter: Emitter<Hitchhiker> = Emitter::new();
    emitter.listen::<Towel>(|_| std::panic::panic_any(42_u32));

    let err = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        emitter.emit::<Towel>((false,));
    }))
    .unwrap_err();

    assert_eq!(err.downcast_ref::<u32>(), Some(&42));
}

#[test]
fn emitter_stays_usable_after_a_listener_panics() {
    let emitter: Emitter<Hitchhiker> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let panicker = emitter.listen::<Beep>(|_| panic!("boom"));
    {
        let calls = Arc::clone(&calls);
        emitter.listen::<Beep>(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        });
    }

    let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        emitter.emit::<Beep>(());
    }));
    emitter.off::<Beep>(&panicker);
    emitter.emit::<Beep>(());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Sharing
// ============================================================================

#[test]
fn emitter_can_be_shared_across_threads() {
    let emitter: Arc<Emitter<Hitchhiker>> = Arc::new(Emitter::new());
    let calls = Arc::new(AtomicUsize::new(0));
    {
        let calls = Arc::clone(&calls);
        emitter.listen::<MeaningOfLife>(move |(n,)| {
            calls.fetch_add(*n as usize, Ordering::SeqCst);
        });
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let emitter = Arc::clone(&emitter);
            thread::spawn(move || emitter.emit::<MeaningOfLife>((10,)))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 40);
}
