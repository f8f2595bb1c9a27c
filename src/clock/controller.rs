use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;
use tokio::{task::JoinHandle, time};
use uuid::Uuid;

use crate::format::format_duration;

use super::{ClockState, SessionClock, SessionPhase, SessionWindow};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Wall-clock source injected by the host. Production uses `Utc::now`; tests
/// substitute a fake so phase transitions are deterministic.
pub type TimeSource = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

type TickSubscriber = Box<dyn Fn(ClockState) + Send + Sync>;

/// One-shot view of the clock, formatted for direct rendering.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ClockSnapshot {
    pub clock_id: Uuid,
    pub state: ClockState,
    /// Countdown digits (`M:SS` / `H:MM:SS`).
    pub display: String,
}

/// Owns a [`SessionClock`] and drives it on a periodic tokio ticker,
/// publishing every computed state to registered subscribers.
///
/// One controller per host view; views sharing a logical session each build
/// their own controller from the same [`SessionWindow`]. The ticker stops on
/// its own once the session ends, after publishing the final `Ended` state.
#[derive(Clone)]
pub struct ClockController {
    clock_id: Uuid,
    clock: Arc<Mutex<SessionClock>>,
    subscribers: Arc<Mutex<Vec<TickSubscriber>>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    running: Arc<AtomicBool>,
    tick_interval: Duration,
    now: TimeSource,
}

impl ClockController {
    pub fn new(window: SessionWindow) -> Self {
        Self::with_options(window, DEFAULT_TICK_INTERVAL, Arc::new(Utc::now))
    }

    pub fn with_options(window: SessionWindow, tick_interval: Duration, now: TimeSource) -> Self {
        Self {
            clock_id: Uuid::new_v4(),
            clock: Arc::new(Mutex::new(SessionClock::new(window))),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            ticker: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(false)),
            tick_interval,
            now,
        }
    }

    pub fn clock_id(&self) -> Uuid {
        self.clock_id
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Registers a subscriber invoked with every published [`ClockState`].
    /// Register before `start`; late subscribers only see subsequent ticks.
    pub fn on_tick(&self, subscriber: impl Fn(ClockState) + Send + Sync + 'static) {
        self.subscribers.lock().unwrap().push(Box::new(subscriber));
    }

    /// Sets the expiry callback, fired exactly once when the session ends.
    /// It runs on the ticker task; calling [`stop`](Self::stop) from inside
    /// it is safe. Set before `start`: replacing the callback re-arms the
    /// at-most-once latch.
    pub fn on_expire(&self, callback: impl FnMut() + Send + 'static) {
        let mut clock = self.clock.lock().unwrap();
        let window = *clock.window();
        *clock = SessionClock::with_expiry_callback(window, callback);
    }

    /// Computes the current state on demand, outside the ticker cadence.
    pub fn snapshot(&self) -> ClockSnapshot {
        let state = self.clock.lock().unwrap().tick((self.now)());
        ClockSnapshot {
            clock_id: self.clock_id,
            display: format_duration(state.remaining_seconds as i64),
            state,
        }
    }

    /// Begins periodic ticking. No-op when already running. Must be called
    /// from within a tokio runtime.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("clock {}: start ignored, ticker already running", self.clock_id);
            return;
        }
        info!(
            "clock {}: ticking every {}ms",
            self.clock_id,
            self.tick_interval.as_millis()
        );

        let clock = self.clock.clone();
        let subscribers = self.subscribers.clone();
        let running = self.running.clone();
        let now = self.now.clone();
        let tick_interval = self.tick_interval;
        let clock_id = self.clock_id;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            loop {
                interval.tick().await;

                // The expiry callback fires inside this lock, on its first
                // Ended tick only.
                let state = { clock.lock().unwrap().tick((now)()) };
                let ended = state.phase == SessionPhase::Ended;

                {
                    let subs = subscribers.lock().unwrap();
                    // Checked under the publish lock: once stop() has
                    // returned, nothing further is delivered.
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                    for subscriber in subs.iter() {
                        subscriber(state.clone());
                    }
                }

                if ended {
                    info!("clock {}: session ended, ticker stopping", clock_id);
                    running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        });

        *self.ticker.lock().unwrap() = Some(handle);
    }

    /// Halts ticking and releases the timer task. Idempotent, and safe to
    /// call from within the expiry callback. After it returns no further
    /// state is published. Must not be called from an `on_tick` subscriber.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.ticker.lock().unwrap().take() {
            handle.abort();
            info!("clock {}: stopped", self.clock_id);
        }
        // Wait out any publish already in flight.
        drop(self.subscribers.lock().unwrap());
    }
}
