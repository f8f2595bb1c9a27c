use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default "ending soon" threshold: 5 minutes before the session ends.
pub const DEFAULT_WARNING_THRESHOLD_SECS: u32 = 300;

/// A scheduled session slot. Immutable for the lifetime of one clock instance;
/// scheduling data comes from the booking service, which is not our concern.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionWindow {
    pub start_time: DateTime<Utc>,
    pub duration_seconds: u32,
    pub warning_threshold_seconds: u32,
}

impl SessionWindow {
    /// Window with the default warning threshold (clamped to the duration for
    /// sessions shorter than 5 minutes).
    pub fn new(start_time: DateTime<Utc>, duration_seconds: u32) -> Result<Self, Error> {
        Self::with_warning_threshold(
            start_time,
            duration_seconds,
            DEFAULT_WARNING_THRESHOLD_SECS.min(duration_seconds),
        )
    }

    pub fn with_warning_threshold(
        start_time: DateTime<Utc>,
        duration_seconds: u32,
        warning_threshold_seconds: u32,
    ) -> Result<Self, Error> {
        if duration_seconds == 0 {
            return Err(Error::InvalidWindow(
                "duration_seconds must be greater than zero".into(),
            ));
        }
        if warning_threshold_seconds > duration_seconds {
            return Err(Error::InvalidWindow(format!(
                "warning threshold {}s exceeds session duration {}s",
                warning_threshold_seconds, duration_seconds
            )));
        }

        Ok(Self {
            start_time,
            duration_seconds,
            warning_threshold_seconds,
        })
    }

    /// Session listings carry durations and warning offsets in whole minutes.
    pub fn from_minutes(
        start_time: DateTime<Utc>,
        duration_minutes: u32,
        warning_minutes: u32,
    ) -> Result<Self, Error> {
        Self::with_warning_threshold(start_time, duration_minutes * 60, warning_minutes * 60)
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::seconds(i64::from(self.duration_seconds))
    }
}
