//! Capacity-bounded reading history for one room.
//!
//! A [`History`] is an append-only, oldest-to-newest sequence of
//! [`Reading`]s with strictly increasing timestamps. Once it holds `window`
//! entries, every append evicts the oldest one.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use roomclimate_core::history::History;
//! use roomclimate_core::generator::SeedRange;
//! use time::{Duration, OffsetDateTime};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let now = OffsetDateTime::now_utc();
//! let history = History::initialize(now, 48, Duration::minutes(30), &SeedRange::default(), &mut rng);
//!
//! assert_eq!(history.len(), 48);
//! assert_eq!(history.latest().unwrap().timestamp, now);
//! ```

use std::collections::VecDeque;

use rand::Rng;
use time::{Duration, OffsetDateTime};

use roomclimate_types::{Error, MAX_WINDOW, Reading, Result};

use crate::generator::{self, SeedRange};

/// Bounded, time-ordered buffer of readings.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Reading>,
    window: usize,
}

impl History {
    /// Create an empty history holding at most `window` readings.
    ///
    /// The window is clamped to `1..=MAX_WINDOW`.
    pub fn new(window: usize) -> Self {
        let window = window.clamp(1, MAX_WINDOW);
        Self {
            entries: VecDeque::with_capacity(window),
            window,
        }
    }

    /// Back-fill `window` synthetic points spaced `interval` apart, the
    /// newest one stamped exactly `now`.
    ///
    /// Fewer points are produced if the earliest ones would fall before the
    /// first representable date.
    pub fn initialize<R: Rng + ?Sized>(
        now: OffsetDateTime,
        window: usize,
        interval: Duration,
        seed: &SeedRange,
        rng: &mut R,
    ) -> Self {
        let mut history = Self::new(window);
        history
            .entries
            .extend(generator::backfill(now, history.window, interval, seed, rng));
        history
    }

    /// Append a reading at the tail, evicting the oldest entries past the
    /// window.
    ///
    /// Fails with [`Error::InvariantViolation`] if the reading is not strictly
    /// newer than the current tail; the history is left untouched.
    pub fn append(&mut self, reading: Reading) -> Result<()> {
        if let Some(last) = self.entries.back()
            && reading.timestamp <= last.timestamp
        {
            return Err(Error::InvariantViolation {
                last: last.timestamp,
                attempted: reading.timestamp,
            });
        }

        self.entries.push_back(reading);
        while self.entries.len() > self.window {
            self.entries.pop_front();
        }
        Ok(())
    }

    /// The newest reading.
    pub fn latest(&self) -> Result<&Reading> {
        self.entries.back().ok_or(Error::EmptyHistory)
    }

    /// The oldest reading still in the window.
    pub fn oldest(&self) -> Option<&Reading> {
        self.entries.front()
    }

    /// An owned copy of every reading, oldest first.
    ///
    /// The copy is detached from the store, so callers can keep or modify it
    /// freely.
    pub fn snapshot(&self) -> Vec<Reading> {
        self.entries.iter().copied().collect()
    }

    /// Iterate readings oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Reading> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Number of readings held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history holds no readings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of readings held.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Whether the history has reached its window.
    pub fn is_full(&self) -> bool {
        self.entries.len() == self.window
    }
}


/// Property-based tests for window and ordering invariants.
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use time::macros::datetime;

    proptest! {
        /// Length never exceeds the window and timestamps stay strictly increasing,
        /// whatever sequence of (possibly out-of-order) appends is attempted.
        #[test]
        fn window_and_order_hold(
            window in 1usize..64,
            offsets in proptest::collection::vec(-120i64..600, 0..200),
        ) {
            let base = datetime!(2025-06-01 00:00 UTC);
            let mut history = History::new(window);
            let mut accepted = 0usize;

            for offset in offsets {
                let reading = Reading::new(base + Duration::minutes(offset), 25.0, 40, 800);
                if history.append(reading).is_ok() {
                    accepted += 1;
                }
                prop_assert!(history.len() <= window);
                prop_assert_eq!(history.len(), accepted.min(window));
            }

            let snapshot = history.snapshot();
            for pair in snapshot.windows(2) {
                prop_assert!(pair[0].timestamp < pair[1].timestamp);
            }
        }
    }
}
