//! Timing core for the counseling dashboard frontend.
//!
//! Two leaf components, both owned and driven by a host view:
//!
//! - [`clock`] — converts a scheduled session window into a discrete phase
//!   (`Upcoming → Active → Ending → Ended`) plus countdown, with an optional
//!   tokio ticker ([`ClockController`]) and at-most-once expiry notification.
//! - [`preview`] — clamps playback positions for locked recordings to a
//!   preview cutoff and denies seeks past it.
//!
//! Neither component reads the system clock directly; hosts inject `now`
//! (per-call or via a time source closure) so the logic tests without real
//! timers.

pub mod clock;
pub mod error;
pub mod format;
pub mod preview;

pub use clock::{
    ClockController, ClockSnapshot, ClockState, SessionClock, SessionPhase, SessionWindow,
};
pub use error::Error;
pub use format::format_duration;
pub use preview::{PreviewGate, PreviewState, PreviewWindow};
