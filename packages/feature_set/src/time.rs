use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::Time;

pub trait TimeProvider: Send + Sync {
    fn current_time(&self) -> Time;
}

/// Wall-clock time from [`switchy_time::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeProvider;

impl SystemTimeProvider {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TimeProvider for SystemTimeProvider {
    fn current_time(&self) -> Time {
        unix_time(switchy_time::now())
    }
}

fn unix_time(now: SystemTime) -> Time {
    match now.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => Time::new(
            i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX),
            elapsed.subsec_micros(),
        ),
        Err(e) => {
            // clock set before 1970
            let before = e.duration();
            let seconds = i64::try_from(before.as_secs()).unwrap_or(i64::MAX);
            match before.subsec_micros() {
                0 => Time::new(-seconds, 0),
                micros => Time::new(-seconds - 1, 1_000_000 - micros),
            }
        }
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeProvider {
    time: Time,
}

impl FixedTimeProvider {
    #[must_use]
    pub const fn new(time: Time) -> Self {
        Self { time }
    }
}

impl TimeProvider for FixedTimeProvider {
    fn current_time(&self) -> Time {
        self.time
    }
}
