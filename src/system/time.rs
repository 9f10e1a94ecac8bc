//! Time keeping module for PineTime

use chrono::{DateTime, Duration, NaiveDateTime};
use embassy_time::Instant;

/// Wall clock time at a known system instant
pub struct TimeReference {
    /// Local clock time
    time: NaiveDateTime,
    /// Related system time
    instant: Instant,
}

impl TimeReference {
    /// Create a reference from a UNIX timestamp and a timezone offset in
    /// seconds, taken now.
    pub fn from_timestamp(utc_secs: i64, offset_secs: i32) -> Option<Self> {
        let time = DateTime::from_timestamp(utc_secs + i64::from(offset_secs), 0)?.naive_utc();
        Some(Self {
            time,
            instant: Instant::now(),
        })
    }
}

pub struct TimeManager {
    reference: TimeReference,
}

impl TimeManager {
    /// Initialize time measurement on boot
    pub fn init(reference: TimeReference) -> Self {
        Self { reference }
    }

    /// Get current local time
    pub fn local_time(&self) -> NaiveDateTime {
        let elapsed = Instant::now().duration_since(self.reference.instant);
        self.reference
            .time
            .checked_add_signed(Duration::milliseconds(elapsed.as_millis() as i64))
            .unwrap_or(self.reference.time)
    }
}
