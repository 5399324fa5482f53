use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use responsive_timer::prelude::*;

type Fake = TimerController<FrameQueue, ManualClock, Recorder>;

fn countdown(duration_ms: i64, clock: &ManualClock, fired: &Arc<AtomicUsize>) -> Fake {
    let fired = Arc::clone(fired);
    let options = TimerConfig::countdown(duration_ms)
        .on_complete(move || {
            fired.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();
    TimerController::new(options, FrameQueue::new(), clock.clone(), Recorder::new())
}

/// Runs one refresh: fires everything the queue has due.
fn refresh(timer: &mut Fake) -> Vec<TickOutcome> {
    let due = timer.scheduler_mut().take_due();
    due.into_iter().map(|h| timer.tick(h).unwrap()).collect()
}

#[test]
fn test_remaining_is_non_increasing_and_ends_at_zero() {
    // Irregular cadence: skipped frames only make the next step larger.
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next_step = move || {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        seed % 70
    };

    for duration in [0, 1, 9, 16, 999, 1_000, 12_345, 3_600_000] {
        let clock = ManualClock::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = countdown(duration, &clock, &fired);
        timer.start().unwrap();

        let mut values = Vec::new();
        while !timer.completed() {
            clock.advance(next_step());
            refresh(&mut timer);
            values.push(timer.last_value().unwrap());
            if duration > 10_000 && values.len() == 50 {
                clock.advance(duration as u64);
            }
        }

        assert!(values.windows(2).all(|w| w[0] >= w[1]), "duration {duration}");
        assert_eq!(values.last(), Some(&0));
        assert_eq!(values[0], duration as u64);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(timer.scheduler().pending(), 0);
    }
}

#[test]
fn test_fixed_tick_schedule() {
    let clock = ManualClock::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let mut timer = countdown(1_000, &clock, &fired);
    timer.start().unwrap();

    let mut remaining = Vec::new();
    for at in [0, 400, 900, 1_000] {
        clock.set_monotonic(at);
        let outcomes = refresh(&mut timer);
        assert_eq!(outcomes.len(), 1);
        remaining.push(timer.last_value().unwrap());
        assert_eq!(fired.load(Ordering::SeqCst), usize::from(at == 1_000));
    }

    assert_eq!(remaining, vec![1_000, 600, 100, 0]);
    assert_eq!(
        timer.sink().frames(),
        &["00:01.00", "00:00.60", "00:00.10", "00:00.00"]
    );
}

#[test]
fn test_stop_before_zero_never_completes() {
    let clock = ManualClock::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let mut timer = countdown(1_000, &clock, &fired);
    timer.start().unwrap();

    refresh(&mut timer);
    clock.advance(500);
    refresh(&mut timer);
    timer.stop();

    clock.advance(10_000);
    assert!(refresh(&mut timer).is_empty());
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(timer.state(), TimerState::Stopped);
    assert_eq!(timer.sink().frames().len(), 2);
}

#[test]
fn test_stop_before_first_tick_renders_nothing() {
    let clock = ManualClock::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let mut timer = countdown(0, &clock, &fired);
    timer.start().unwrap();
    timer.stop();
    timer.stop();

    assert!(refresh(&mut timer).is_empty());
    assert!(timer.sink().frames().is_empty());
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[test]
fn test_hour_long_countdown_first_frame() {
    let clock = ManualClock::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let mut timer = countdown(3_661_000, &clock, &fired);
    timer.start().unwrap();

    refresh(&mut timer);
    assert_eq!(timer.sink().last(), Some("01:01:01.00"));
}

#[test]
fn test_clock_runs_until_stopped() {
    let clock = ManualClock::with_wall(0);
    let options = TimerConfig::clock().timezone_offset(0).build().unwrap();
    let mut timer = TimerController::new(options, FrameQueue::new(), clock.clone(), Recorder::new());
    timer.start().unwrap();

    for _ in 0..1_000 {
        clock.advance(16);
        assert!(matches!(
            refresh(&mut timer).as_slice(),
            [TickOutcome::Rendered { .. }]
        ));
    }
    assert_eq!(timer.sink().last(), Some("00:00:16.00"));
    assert!(!timer.completed());

    timer.stop();
    assert!(refresh(&mut timer).is_empty());
}

#[test]
fn test_two_timers_share_a_refresh_loop() {
    let clock = ManualClock::with_wall(0);
    let fired = Arc::new(AtomicUsize::new(0));
    let mut down = countdown(100, &clock, &fired);
    let mut wall = TimerController::new(
        TimerConfig::clock().timezone_offset(60).build().unwrap(),
        FrameQueue::new(),
        clock.clone(),
        LatestFrame::new(),
    );
    down.start().unwrap();
    wall.start().unwrap();

    while !down.completed() {
        clock.advance(16);
        refresh(&mut down);
        for h in wall.scheduler_mut().take_due() {
            wall.tick(h).unwrap();
        }
    }

    assert!(wall.is_running());
    assert_eq!(wall.sink().text(), Some("01:00:00.12"));
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}
