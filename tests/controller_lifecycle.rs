use std::sync::{
    atomic::{AtomicI64, AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use sessionwatch::clock::TimeSource;
use sessionwatch::{ClockController, ClockState, SessionPhase, SessionWindow};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()
}

/// Fake wall clock: `base() + offset`, stepped by the test.
fn fake_time(offset: &Arc<AtomicI64>) -> TimeSource {
    let offset = offset.clone();
    Arc::new(move || base() + chrono::Duration::seconds(offset.load(Ordering::SeqCst)))
}

fn collecting_controller(
    window: SessionWindow,
    offset: &Arc<AtomicI64>,
) -> (ClockController, Arc<Mutex<Vec<ClockState>>>, Arc<AtomicUsize>) {
    let controller =
        ClockController::with_options(window, Duration::from_millis(10), fake_time(offset));

    let states = Arc::new(Mutex::new(Vec::new()));
    let sink = states.clone();
    controller.on_tick(move |state| sink.lock().unwrap().push(state));

    let expiries = Arc::new(AtomicUsize::new(0));
    let counter = expiries.clone();
    controller.on_expire(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    (controller, states, expiries)
}

#[tokio::test]
async fn ended_session_publishes_once_and_stops() {
    init_logs();
    let window = SessionWindow::with_warning_threshold(base(), 5, 2).unwrap();
    let offset = Arc::new(AtomicI64::new(10)); // already past the end
    let (controller, states, expiries) = collecting_controller(window, &offset);

    controller.start();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let states = states.lock().unwrap();
    assert_eq!(states.len(), 1, "ticker should stop after the final state");
    assert_eq!(states[0].phase, SessionPhase::Ended);
    assert_eq!(expiries.load(Ordering::SeqCst), 1);
    assert!(!controller.is_running());
}

#[tokio::test]
async fn walks_phases_in_order() {
    init_logs();
    let window = SessionWindow::with_warning_threshold(base(), 10, 3).unwrap();
    let offset = Arc::new(AtomicI64::new(-2));
    let (controller, states, expiries) = collecting_controller(window, &offset);

    controller.start();
    tokio::time::sleep(Duration::from_millis(80)).await;
    offset.store(5, Ordering::SeqCst); // mid-session
    tokio::time::sleep(Duration::from_millis(80)).await;
    offset.store(8, Ordering::SeqCst); // inside the warning threshold
    tokio::time::sleep(Duration::from_millis(80)).await;
    offset.store(12, Ordering::SeqCst); // past the end
    tokio::time::sleep(Duration::from_millis(120)).await;

    let states = states.lock().unwrap();
    assert!(!states.is_empty());

    let phases: Vec<SessionPhase> = states.iter().map(|s| s.phase).collect();
    for pair in phases.windows(2) {
        assert!(pair[0] <= pair[1], "phase regressed: {:?}", phases);
    }
    for expected in [
        SessionPhase::Upcoming,
        SessionPhase::Active,
        SessionPhase::Ending,
        SessionPhase::Ended,
    ] {
        assert!(phases.contains(&expected), "missing {expected:?} in {phases:?}");
    }

    assert_eq!(expiries.load(Ordering::SeqCst), 1);
    assert!(!controller.is_running());
}

#[tokio::test]
async fn stop_halts_publishing() {
    init_logs();
    let window = SessionWindow::new(base(), 1000).unwrap();
    let offset = Arc::new(AtomicI64::new(0));
    let (controller, states, _expiries) = collecting_controller(window, &offset);

    controller.start();
    tokio::time::sleep(Duration::from_millis(60)).await;
    controller.stop();

    let published = states.lock().unwrap().len();
    assert!(published > 0);

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(states.lock().unwrap().len(), published);
    assert!(!controller.is_running());

    // Idempotent.
    controller.stop();
    assert!(!controller.is_running());
}

#[tokio::test]
async fn start_twice_is_a_noop() {
    init_logs();
    let window = SessionWindow::new(base(), 1000).unwrap();
    let offset = Arc::new(AtomicI64::new(0));
    let (controller, _states, _expiries) = collecting_controller(window, &offset);

    controller.start();
    controller.start();
    assert!(controller.is_running());

    controller.stop();
    assert!(!controller.is_running());
}

#[tokio::test]
async fn snapshot_renders_countdown() {
    init_logs();
    let window = SessionWindow::new(base(), 3600).unwrap();
    let offset = Arc::new(AtomicI64::new(0));
    let controller =
        ClockController::with_options(window, Duration::from_millis(10), fake_time(&offset));

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.clock_id, controller.clock_id());
    assert_eq!(snapshot.state.phase, SessionPhase::Active);
    assert_eq!(snapshot.display, "1:00:00");

    offset.store(3475, Ordering::SeqCst);
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.state.phase, SessionPhase::Ending);
    assert_eq!(snapshot.display, "2:05");
}
