//! Bounded random-walk reading generator.
//!
//! Every metric drifts by an independent uniform perturbation per step and is
//! clamped to the domain bounds. The same [`step`] function serves both the
//! back-fill at initialization ([`StepMagnitude::BACKFILL`]) and the live
//! tick ([`StepMagnitude::LIVE`]); only the step magnitude differs.
//!
//! | Metric | Live step | Back-fill step | Bounds |
//! |--------|-----------|----------------|--------|
//! | Temperature | ±0.8 °C | ±0.6 °C | 20.0–36.0 °C, one decimal |
//! | Humidity | ±3 % | ±2 % | 15–70 %, whole |
//! | CO₂ | ±90 ppm | ±60 ppm | 450–1600 ppm, whole |
//!
//! Live points are only produced once the elapsed-time gate has opened (see
//! [`gate_open`]), which models fixed-interval sensor sampling no matter how
//! often the engine is polled.

use std::ops::RangeInclusive;

use rand::Rng;
use time::{Duration, OffsetDateTime};
use tracing::warn;

use roomclimate_types::{
    CO2_MAX, CO2_MIN, Error, HUMIDITY_MAX, HUMIDITY_MIN, MAX_WINDOW, Reading, Result,
    TEMPERATURE_MAX, TEMPERATURE_MIN,
};

use crate::history::History;

/// Maximum perturbation per step for each metric.
///
/// Each draw is uniform in `-magnitude..=magnitude`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepMagnitude {
    /// Temperature step in °C.
    pub temperature: f32,
    /// Humidity step in percentage points, rounded to whole points.
    pub humidity: f32,
    /// CO2 step in ppm, rounded to whole ppm.
    pub co2: f32,
}

impl StepMagnitude {
    /// Step size for live ticks.
    pub const LIVE: Self = Self {
        temperature: 0.8,
        humidity: 3.0,
        co2: 90.0,
    };

    /// Narrower step size for the smoother initial 24-hour history.
    pub const BACKFILL: Self = Self {
        temperature: 0.6,
        humidity: 2.0,
        co2: 60.0,
    };
}

impl Default for StepMagnitude {
    fn default() -> Self {
        Self::LIVE
    }
}

/// Ranges the randomized starting point of a back-fill is drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedRange {
    /// Starting temperature in °C.
    pub temperature: RangeInclusive<f32>,
    /// Starting humidity in percent, rounded to whole points.
    pub humidity: RangeInclusive<f32>,
    /// Starting CO2 in ppm, rounded to whole ppm.
    pub co2: RangeInclusive<f32>,
}

impl Default for SeedRange {
    fn default() -> Self {
        Self {
            temperature: 24.5..=30.5,
            humidity: 25.0..=50.0,
            co2: 650.0..=1100.0,
        }
    }
}

/// Draw a plausible starting reading stamped `timestamp`.
pub fn seed_reading<R: Rng + ?Sized>(
    timestamp: OffsetDateTime,
    seed: &SeedRange,
    rng: &mut R,
) -> Reading {
    let temperature = rng
        .random_range(seed.temperature.clone())
        .clamp(TEMPERATURE_MIN, TEMPERATURE_MAX);
    let humidity = clamp_whole(0, rng.random_range(seed.humidity.clone()), HUMIDITY_MIN, HUMIDITY_MAX);
    let co2 = clamp_whole(0, rng.random_range(seed.co2.clone()), CO2_MIN, CO2_MAX);
    Reading::new(timestamp, temperature, humidity, co2)
}

/// Advance `last` by one random-walk step, stamping the result `timestamp`.
///
/// Temperature is clamped then rounded to one decimal; humidity and CO2
/// perturbations are rounded to whole units before clamping.
pub fn step<R: Rng + ?Sized>(
    last: &Reading,
    timestamp: OffsetDateTime,
    magnitude: &StepMagnitude,
    rng: &mut R,
) -> Reading {
    let temperature = (last.temperature + perturbation(rng, magnitude.temperature))
        .clamp(TEMPERATURE_MIN, TEMPERATURE_MAX);
    let humidity = clamp_whole(
        last.humidity,
        perturbation(rng, magnitude.humidity),
        HUMIDITY_MIN,
        HUMIDITY_MAX,
    );
    let co2 = clamp_whole(last.co2, perturbation(rng, magnitude.co2), CO2_MIN, CO2_MAX);
    Reading::new(timestamp, temperature, humidity, co2)
}

/// The live step: one [`StepMagnitude::LIVE`] step stamped with `now`
/// truncated to the minute.
pub fn next_reading<R: Rng + ?Sized>(last: &Reading, now: OffsetDateTime, rng: &mut R) -> Reading {
    step(last, truncate_to_minute(now), &StepMagnitude::LIVE, rng)
}

/// Whether enough simulated time has passed since `last` to emit a new point.
pub fn gate_open(last: &Reading, now: OffsetDateTime, interval: Duration) -> bool {
    now - last.timestamp >= interval
}

/// Compute the next live point for `history` without modifying it.
///
/// Returns `None` when the gate is still closed. Fails with
/// [`Error::InvariantViolation`] if the gated point would not be strictly
/// newer than the tail, which only happens with sub-minute intervals.
pub fn plan_next<R: Rng + ?Sized>(
    history: &History,
    now: OffsetDateTime,
    interval: Duration,
    rng: &mut R,
) -> Result<Option<Reading>> {
    let last = *history.latest()?;
    if !gate_open(&last, now, interval) {
        return Ok(None);
    }
    let next = next_reading(&last, now, rng);
    if next.timestamp <= last.timestamp {
        return Err(Error::InvariantViolation {
            last: last.timestamp,
            attempted: next.timestamp,
        });
    }
    Ok(Some(next))
}

/// Apply one gated live step to `history`.
///
/// Returns the appended reading, or `None` when the gate is still closed and
/// the history was left unchanged.
pub fn advance<R: Rng + ?Sized>(
    history: &mut History,
    now: OffsetDateTime,
    interval: Duration,
    rng: &mut R,
) -> Result<Option<Reading>> {
    let next = plan_next(history, now, interval, rng)?;
    if let Some(reading) = next {
        history.append(reading)?;
    }
    Ok(next)
}

/// Generate `count` back-filled readings spaced `interval` apart, oldest
/// first, the newest stamped exactly `now`.
///
/// Stops early, returning fewer readings, if an earlier timestamp would fall
/// before the first representable date.
pub fn backfill<R: Rng + ?Sized>(
    now: OffsetDateTime,
    count: usize,
    interval: Duration,
    seed: &SeedRange,
    rng: &mut R,
) -> Vec<Reading> {
    if count == 0 {
        return Vec::new();
    }

    let mut timestamps = Vec::with_capacity(count.min(MAX_WINDOW));
    let mut timestamp = now;
    timestamps.push(now);
    while timestamps.len() < count {
        let Some(earlier) = timestamp.checked_sub(interval) else {
            warn!(
                "Back-fill truncated to {} of {} points: timestamps before {} are out of range",
                timestamps.len(),
                count,
                timestamp
            );
            break;
        };
        timestamp = earlier;
        timestamps.push(earlier);
    }
    timestamps.reverse();

    let start = timestamps[0];
    let mut last = seed_reading(start.checked_sub(interval).unwrap_or(start), seed, rng);
    timestamps
        .into_iter()
        .map(|timestamp| {
            last = step(&last, timestamp, &StepMagnitude::BACKFILL, rng);
            last
        })
        .collect()
}

/// Zero the seconds and sub-second part of a timestamp.
pub fn truncate_to_minute(ts: OffsetDateTime) -> OffsetDateTime {
    ts - Duration::new(i64::from(ts.second()), ts.nanosecond() as i32)
}

fn perturbation<R: Rng + ?Sized>(rng: &mut R, magnitude: f32) -> f32 {
    let magnitude = magnitude.abs();
    rng.random_range(-magnitude..=magnitude)
}

fn clamp_whole<T>(base: T, delta: f32, min: T, max: T) -> T
where
    T: Into<i32> + TryFrom<i32> + Copy,
{
    let value = (base.into() + delta.round() as i32).clamp(min.into(), max.into());
    T::try_from(value).unwrap_or(max)
}
