use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::window::SessionWindow;

/// Where a session sits relative to its scheduled window. Transitions are
/// monotonic (`Upcoming → Active → Ending → Ended`); a phase may be skipped
/// but never revisited, provided ticks arrive in non-decreasing `now` order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Upcoming,
    Active,
    Ending,
    Ended,
}

impl SessionPhase {
    /// Countdown caption shown next to the timer digits.
    pub fn status_text(&self) -> &'static str {
        match self {
            SessionPhase::Upcoming => "Starts in",
            SessionPhase::Active => "Time remaining",
            SessionPhase::Ending => "Ending soon",
            SessionPhase::Ended => "Session ended",
        }
    }

    /// Short badge label.
    pub fn badge_label(&self) -> &'static str {
        match self {
            SessionPhase::Upcoming => "Upcoming",
            SessionPhase::Active => "Live",
            SessionPhase::Ending => "Ending Soon",
            SessionPhase::Ended => "Ended",
        }
    }
}

/// Snapshot computed on every tick. Never mutated by callers; the next tick
/// replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClockState {
    pub phase: SessionPhase,
    /// Seconds until the relevant boundary: start while `Upcoming`, end while
    /// `Active`/`Ending`, zero once `Ended`.
    pub remaining_seconds: u64,
    /// Seconds since the session started, floored at zero before the start.
    pub elapsed_seconds: u64,
    /// Scheduled length, carried so the payload renders without the window.
    pub duration_seconds: u32,
    pub has_fired_expiry: bool,
}

impl ClockState {
    /// Fraction of the session still remaining, in `[0, 1]`. Drives the
    /// countdown progress bar.
    pub fn progress_remaining(&self) -> f64 {
        match self.phase {
            SessionPhase::Upcoming => 1.0,
            SessionPhase::Ended => 0.0,
            _ => self.remaining_seconds as f64 / f64::from(self.duration_seconds),
        }
    }
}

/// Phase state machine over one [`SessionWindow`].
///
/// `tick` is pure given `now` apart from one side effect: the first tick at or
/// past the session end invokes the expiry callback, exactly once per clock
/// lifetime. The host supplies `now` so the engine never reads a global clock.
pub struct SessionClock {
    window: SessionWindow,
    has_fired_expiry: bool,
    on_expire: Option<Box<dyn FnMut() + Send>>,
}

impl SessionClock {
    pub fn new(window: SessionWindow) -> Self {
        Self {
            window,
            has_fired_expiry: false,
            on_expire: None,
        }
    }

    pub fn with_expiry_callback(
        window: SessionWindow,
        on_expire: impl FnMut() + Send + 'static,
    ) -> Self {
        Self {
            window,
            has_fired_expiry: false,
            on_expire: Some(Box::new(on_expire)),
        }
    }

    pub fn window(&self) -> &SessionWindow {
        &self.window
    }

    /// Computes the state for `now`. Total over any instant, including times
    /// far before the start or after the end; never panics.
    ///
    /// Precondition (not defended): successive calls receive non-decreasing
    /// `now` values. Jittered or delayed ticks are fine, going backwards in
    /// time is not.
    pub fn tick(&mut self, now: DateTime<Utc>) -> ClockState {
        let start = self.window.start_time;
        let end = self.window.end_time();

        if now < start {
            return self.state(SessionPhase::Upcoming, ceil_seconds(start - now), 0);
        }

        if now < end {
            let remaining = ceil_seconds(end - now);
            let elapsed = (now - start).num_seconds().max(0) as u64;
            let phase = if remaining <= u64::from(self.window.warning_threshold_seconds) {
                SessionPhase::Ending
            } else {
                SessionPhase::Active
            };
            return self.state(phase, remaining, elapsed);
        }

        if !self.has_fired_expiry {
            self.has_fired_expiry = true;
            if let Some(on_expire) = self.on_expire.as_mut() {
                on_expire();
            }
        }
        self.state(SessionPhase::Ended, 0, u64::from(self.window.duration_seconds))
    }

    fn state(&self, phase: SessionPhase, remaining_seconds: u64, elapsed_seconds: u64) -> ClockState {
        ClockState {
            phase,
            remaining_seconds,
            elapsed_seconds,
            duration_seconds: self.window.duration_seconds,
            has_fired_expiry: self.has_fired_expiry,
        }
    }
}

/// Whole seconds until the boundary, rounded up so a countdown shows `1`
/// until the boundary actually passes. Non-positive deltas collapse to zero.
fn ceil_seconds(delta: Duration) -> u64 {
    let ms = delta.num_milliseconds();
    if ms <= 0 {
        0
    } else {
        ((ms + 999) / 1000) as u64
    }
}
