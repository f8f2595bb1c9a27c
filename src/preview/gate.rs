use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Preview terms for one recording. `locked` reflects the viewer's license,
/// decided by the host; the gate never grants or revokes access itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreviewWindow {
    pub preview_cutoff_seconds: f64,
    pub locked: bool,
}

impl PreviewWindow {
    pub fn new(preview_cutoff_seconds: f64, locked: bool) -> Result<Self, Error> {
        if !preview_cutoff_seconds.is_finite() || preview_cutoff_seconds <= 0.0 {
            return Err(Error::InvalidWindow(
                "preview_cutoff_seconds must be a positive number".into(),
            ));
        }
        Ok(Self {
            preview_cutoff_seconds,
            locked,
        })
    }
}

/// Result of one position observation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreviewState {
    /// Reported position, clamped to the cutoff while locked.
    pub position: f64,
    /// Sticky once true; cleared only by `reset` (or made moot by `unlock`).
    pub cutoff_reached: bool,
    /// Whole seconds of preview left ("Ns left" badge). `None` when unlocked.
    pub preview_remaining_seconds: Option<u64>,
}

/// Bounded-playback cutoff for locked recordings.
///
/// The media element stays in charge of actual playback; the host feeds every
/// position update through [`observe`](Self::observe) and every seek attempt
/// through [`attempt_seek`](Self::attempt_seek), then pauses or blocks based
/// on what comes back. The gate only decides, it never touches the player.
#[derive(Debug)]
pub struct PreviewGate {
    cutoff_seconds: f64,
    locked: bool,
    cutoff_reached: bool,
    position: f64,
}

impl PreviewGate {
    pub fn new(window: PreviewWindow) -> Result<Self, Error> {
        // Re-validate: PreviewWindow is a plain serde struct and may arrive
        // deserialized rather than through its constructor.
        let window = PreviewWindow::new(window.preview_cutoff_seconds, window.locked)?;
        Ok(Self {
            cutoff_seconds: window.preview_cutoff_seconds,
            locked: window.locked,
            cutoff_reached: false,
            position: 0.0,
        })
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn cutoff_reached(&self) -> bool {
        self.locked && self.cutoff_reached
    }

    /// Records a playback position update. Positions cannot be negative in
    /// this domain, so malformed input clamps to zero instead of erroring.
    pub fn observe(&mut self, raw_position: f64) -> PreviewState {
        let raw = sanitize_position(raw_position);

        if !self.locked {
            self.position = raw;
            return PreviewState {
                position: raw,
                cutoff_reached: false,
                preview_remaining_seconds: None,
            };
        }

        if raw >= self.cutoff_seconds {
            self.cutoff_reached = true;
            self.position = self.cutoff_seconds;
        } else {
            self.position = raw;
        }

        PreviewState {
            position: self.position,
            cutoff_reached: self.cutoff_reached,
            preview_remaining_seconds: Some(
                (self.cutoff_seconds - self.position).floor().max(0.0) as u64
            ),
        }
    }

    /// Accepts or denies a seek target. While locked, anything past the
    /// cutoff comes back as [`Error::SeekDenied`] for the host to surface as
    /// an upgrade prompt; the target itself is returned when accepted.
    pub fn attempt_seek(&self, target_position: f64) -> Result<f64, Error> {
        let target = sanitize_position(target_position);
        if self.locked && target > self.cutoff_seconds {
            return Err(Error::SeekDenied {
                requested: target,
                cutoff: self.cutoff_seconds,
            });
        }
        Ok(target)
    }

    /// Clears the sticky cutoff flag and rewinds to zero, for when the
    /// viewer's entitlement changes and playback restarts.
    pub fn reset(&mut self) {
        self.cutoff_reached = false;
        self.position = 0.0;
    }

    /// Lifts the restriction entirely; `observe` and `attempt_seek` become
    /// passthrough.
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Current position as a percentage of the effective track length
    /// (the cutoff caps it while locked). Zero when the duration is unknown.
    pub fn progress_percent(&self, media_duration: f64) -> f64 {
        if !media_duration.is_finite() || media_duration <= 0.0 {
            return 0.0;
        }
        let max = if self.locked {
            self.cutoff_seconds.min(media_duration)
        } else {
            media_duration
        };
        (self.position / max * 100.0).min(100.0)
    }

    /// Share of the full recording the preview covers, for the seek-bar
    /// overlay. 100 when unlocked or the duration is unknown.
    pub fn preview_percent(&self, media_duration: f64) -> f64 {
        if !self.locked || !media_duration.is_finite() || media_duration <= 0.0 {
            return 100.0;
        }
        (self.cutoff_seconds / media_duration * 100.0).min(100.0)
    }
}

fn sanitize_position(position: f64) -> f64 {
    if !position.is_finite() || position < 0.0 {
        0.0
    } else {
        position
    }
}
