//! Time sources for driving the registry.
//!
//! The engine never reads the wall clock itself; every tick is handed a
//! timestamp by a [`Clock`]. This keeps the simulation replayable.

use std::sync::Mutex;
use std::time::Instant;

use time::{Duration, OffsetDateTime};

/// Supplies the current timestamp for a tick.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> OffsetDateTime;
}

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<OffsetDateTime>,
}

impl ManualClock {
    /// Create a clock stopped at `start`.
    pub fn new(start: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, to: OffsetDateTime) {
        *self.now.lock().expect("clock lock poisoned") = to;
    }

    /// Move forward (or backward, for a negative duration).
    pub fn advance(&self, by: Duration) {
        *self.now.lock().expect("clock lock poisoned") += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().expect("clock lock poisoned")
    }
}

/// Simulated time that runs `scale` times faster than the wall clock.
///
/// Starts at `origin` and advances `scale` simulated seconds per real
/// second, so a 30-minute sampling gate opens after `1800 / scale` seconds.
#[derive(Debug, Clone, Copy)]
pub struct ScaledClock {
    origin: OffsetDateTime,
    started: Instant,
    scale: f64,
}

impl ScaledClock {
    /// Start a scaled clock now. Non-positive or non-finite scales fall back
    /// to real time.
    pub fn new(origin: OffsetDateTime, scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        Self {
            origin,
            started: Instant::now(),
            scale,
        }
    }

    /// Simulated seconds per wall second.
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Clock for ScaledClock {
    fn now(&self) -> OffsetDateTime {
        let elapsed = self.started.elapsed().as_secs_f64() * self.scale;
        self.origin + Duration::seconds_f64(elapsed)
    }
}
