//! End-to-end timing behavior of the controls on a virtual clock

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use ui_timing::{
    controls::{check_edge, Countdown, CountdownOptions, ScrollGeometry, ScrollSnapshot},
    DebounceOptions, Debounced, Edge, ManualScheduler, Outcome,
};

type Fired = Arc<Mutex<Vec<(Duration, &'static str)>>>;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Debouncer whose action records the virtual time and argument of each call
fn recording_debouncer(
    scheduler: &Arc<ManualScheduler>,
    options: DebounceOptions,
) -> (Debounced<&'static str>, Fired) {
    let fired: Fired = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&fired);
    let clock = Arc::clone(scheduler);
    let debounced = Debounced::new(scheduler.clone(), options, move |arg: &'static str| {
        sink.lock().unwrap().push((clock.now(), arg));
        Ok(())
    });
    (debounced, fired)
}

/// Deliver `(time, arg)` triggers in order, then let every timer run out
fn replay(
    scheduler: &ManualScheduler,
    debounced: &Debounced<&'static str>,
    triggers: &[(u64, &'static str)],
) -> Vec<Outcome> {
    let outcomes = triggers
        .iter()
        .map(|&(at, arg)| {
            scheduler.advance_to(ms(at));
            debounced.call(arg).unwrap()
        })
        .collect();
    scheduler.advance(ms(10_000));
    outcomes
}

#[test]
fn leading_burst_fires_once_at_start() {
    let scheduler = Arc::new(ManualScheduler::new());
    let (debounced, fired) = recording_debouncer(&scheduler, DebounceOptions::leading(ms(300)));

    let outcomes = replay(&scheduler, &debounced, &[(0, "a"), (50, "b"), (100, "c"), (250, "d")]);

    assert_eq!(*fired.lock().unwrap(), vec![(ms(0), "a")]);
    assert_eq!(
        outcomes,
        vec![Outcome::Fired, Outcome::Suppressed, Outcome::Suppressed, Outcome::Suppressed]
    );
}

#[test]
fn leading_trigger_after_quiet_period_opens_new_burst() {
    let scheduler = Arc::new(ManualScheduler::new());
    let (debounced, fired) = recording_debouncer(&scheduler, DebounceOptions::leading(ms(300)));

    replay(&scheduler, &debounced, &[(0, "a"), (50, "b"), (100, "c"), (500, "d")]);

    // 100 -> 500 is a 400ms gap, longer than the quiet period.
    assert_eq!(*fired.lock().unwrap(), vec![(ms(0), "a"), (ms(500), "d")]);
}

#[test]
fn trailing_burst_fires_once_after_last_trigger() {
    let scheduler = Arc::new(ManualScheduler::new());
    let (debounced, fired) = recording_debouncer(&scheduler, DebounceOptions::trailing(ms(300)));

    let outcomes = replay(&scheduler, &debounced, &[(0, "a"), (50, "b"), (100, "c"), (250, "d")]);

    assert_eq!(*fired.lock().unwrap(), vec![(ms(550), "d")]);
    assert_eq!(
        outcomes,
        vec![Outcome::Scheduled, Outcome::Rescheduled, Outcome::Rescheduled, Outcome::Rescheduled]
    );
}

#[test]
fn trailing_fires_quiet_period_after_each_burst() {
    let scheduler = Arc::new(ManualScheduler::new());
    let (debounced, fired) = recording_debouncer(&scheduler, DebounceOptions::trailing(ms(300)));

    replay(&scheduler, &debounced, &[(0, "a"), (50, "b"), (100, "c"), (500, "d")]);

    assert_eq!(*fired.lock().unwrap(), vec![(ms(400), "c"), (ms(800), "d")]);
}

#[test]
fn cancel_is_idempotent() {
    let scheduler = Arc::new(ManualScheduler::new());
    let (debounced, fired) = recording_debouncer(&scheduler, DebounceOptions::trailing(ms(300)));

    assert!(!debounced.cancel());
    debounced.call("a").unwrap();
    assert!(debounced.cancel());
    assert!(!debounced.cancel());
    assert!(!debounced.is_pending());
    assert_eq!(scheduler.pending(), 0);

    scheduler.advance(ms(1_000));
    assert!(fired.lock().unwrap().is_empty());

    // A fresh trigger after cancel starts a new session as usual.
    debounced.call("b").unwrap();
    scheduler.advance(ms(300));
    assert_eq!(*fired.lock().unwrap(), vec![(ms(1_300), "b")]);
}

#[test]
fn cancel_in_leading_mode_reopens_immediately() {
    let scheduler = Arc::new(ManualScheduler::new());
    let (debounced, fired) = recording_debouncer(&scheduler, DebounceOptions::leading(ms(300)));

    debounced.call("a").unwrap();
    debounced.cancel();
    scheduler.advance(ms(10));
    assert_eq!(debounced.call("b").unwrap(), Outcome::Fired);
    assert_eq!(*fired.lock().unwrap(), vec![(ms(0), "a"), (ms(10), "b")]);
}

#[test]
fn countdown_full_cycle() {
    let scheduler = Arc::new(ManualScheduler::new());
    let countdown = Countdown::new(scheduler.clone(), CountdownOptions::default());

    countdown.start(3);
    let mut seen = vec![(countdown.label(), countdown.is_locked())];
    for _ in 0..3 {
        scheduler.advance(Duration::from_secs(1));
        seen.push((countdown.label(), countdown.is_locked()));
    }

    assert_eq!(
        seen,
        vec![
            ("03s until resend".to_string(), true),
            ("02s until resend".to_string(), true),
            ("01s until resend".to_string(), true),
            ("Get verification code".to_string(), false),
        ]
    );
    assert_eq!(countdown.remaining(), 3);
    assert!(!countdown.is_active());
    assert_eq!(scheduler.pending(), 0);

    // Idle stays idle.
    scheduler.advance(Duration::from_secs(5));
    assert_eq!(countdown.label(), "Get verification code");
}

#[test]
fn countdown_restart_replaces_running_cycle() {
    let scheduler = Arc::new(ManualScheduler::new());
    let countdown = Countdown::new(scheduler.clone(), CountdownOptions::default());

    countdown.start(3);
    scheduler.advance(Duration::from_secs(1));
    assert_eq!(countdown.label(), "02s until resend");

    scheduler.advance(ms(500));
    countdown.start(5);
    assert_eq!(scheduler.pending(), 1);
    assert_eq!(countdown.label(), "05s until resend");

    // The old cycle's tick at t=2s must not apply.
    scheduler.advance(ms(500));
    assert_eq!(countdown.label(), "05s until resend");

    scheduler.advance(ms(500));
    assert_eq!(countdown.label(), "04s until resend");

    scheduler.advance(Duration::from_secs(4));
    assert!(!countdown.is_locked());
    assert_eq!(countdown.remaining(), 5);
}

#[test]
fn countdown_labels_follow_custom_options() {
    let scheduler = Arc::new(ManualScheduler::new());
    let options = CountdownOptions {
        default_total_seconds: 15,
        tick: ms(250),
        idle_label: "Resend".to_string(),
        suffix: "s".to_string(),
    };
    let countdown = Countdown::new(scheduler.clone(), options);

    countdown.start_default();
    assert_eq!(countdown.label(), "15s");
    scheduler.advance(ms(250));
    assert_eq!(countdown.label(), "14s");
    scheduler.advance(ms(14 * 250));
    assert_eq!(countdown.label(), "Resend");
}

fn scroll(scroll_top: f64, edge: Edge, tolerance: f64) -> (bool, bool) {
    let mut event = ScrollSnapshot::new(ScrollGeometry::new(1_000.0, 500.0, scroll_top));
    let mut fired = false;
    check_edge(&mut event, || fired = true, edge, tolerance);
    (fired, event.default_prevented)
}

#[test]
fn scroll_bottom_detection() {
    assert_eq!(scroll(410.0, Edge::Bottom, 100.0), (true, true));
    assert_eq!(scroll(300.0, Edge::Bottom, 100.0), (false, true));
    assert_eq!(scroll(400.0, Edge::Bottom, 100.0), (true, true));
    assert_eq!(scroll(399.0, Edge::Bottom, 100.0), (false, true));
}

#[test]
fn scroll_top_detection() {
    assert_eq!(scroll(0.0, Edge::Top, 100.0), (true, true));
    assert_eq!(scroll(1.0, Edge::Top, 100.0), (false, true));
    assert_eq!(scroll(1.0, Edge::Top, 10_000.0), (false, true));
}

#[test]
fn scroll_pagination_debounced_to_one_load() {
    let scheduler = Arc::new(ManualScheduler::new());
    let loads = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&loads);
    let load_next = Debounced::new(scheduler.clone(), DebounceOptions::default(), move |()| {
        *counter.lock().unwrap() += 1;
        Ok(())
    });

    // Five scroll events at the bottom within one frame burst.
    for step in 0..5 {
        scheduler.advance(ms(16));
        let geometry = ScrollGeometry::new(1_000.0, 500.0, 450.0 + step as f64);
        let mut event = ScrollSnapshot::new(geometry);
        check_edge(
            &mut event,
            || {
                load_next.call(()).unwrap();
            },
            Edge::Bottom,
            100.0,
        );
    }

    assert_eq!(*loads.lock().unwrap(), 1);
    assert_eq!(load_next.stats().suppressed, 4);
}
