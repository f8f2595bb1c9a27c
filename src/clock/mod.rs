pub mod controller;
pub mod state;
pub mod window;

pub use controller::{ClockController, ClockSnapshot, TimeSource, DEFAULT_TICK_INTERVAL};
pub use state::{ClockState, SessionClock, SessionPhase};
pub use window::SessionWindow;
