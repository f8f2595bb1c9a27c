use thiserror::Error;

/// Errors produced by window construction and seek validation.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Window parameters failed construction-time validation. Fatal to the
    /// instance; the host should fall back to its "unavailable" state.
    #[error("invalid window: {0}")]
    InvalidWindow(String),
    /// Seek target lies past the preview cutoff while the gate is locked.
    /// Expected and recoverable; the host shows an upgrade prompt.
    #[error("seek to {requested:.1}s denied, preview ends at {cutoff:.1}s")]
    SeekDenied { requested: f64, cutoff: f64 },
}
