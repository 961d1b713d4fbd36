//! The room registry: owner of every room and of the shared thresholds.
//!
//! A [`Registry`] is created once with a back-filled history per room and is
//! then advanced by [`Registry::tick`]. Each tick runs under a single write
//! lock, so readers never see a room whose history was extended but whose
//! alerts were not yet recomputed. The current reading is never stored; it
//! is always the newest history entry.
//!
//! # Example
//!
//! ```
//! use roomclimate_core::{Registry, RegistryConfig};
//! use time::{Duration, OffsetDateTime};
//!
//! let start = OffsetDateTime::now_utc();
//! let registry = Registry::with_seed(start, RegistryConfig::default(), 1);
//!
//! // Too early: the 30-minute gate is still closed.
//! let report = registry.tick(start + Duration::minutes(5)).unwrap();
//! assert_eq!(report.appended_count(), 0);
//!
//! // Every room gains exactly one point.
//! let report = registry.tick(start + Duration::minutes(31)).unwrap();
//! assert_eq!(report.appended_count(), 10);
//!
//! let room = registry.room(3).unwrap();
//! assert_eq!(room.history.len(), 48);
//! assert_eq!(room.current, *room.history.last().unwrap());
//! ```

use std::sync::RwLock;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use time::{Duration, OffsetDateTime};
use tracing::{debug, error, info, warn};

use roomclimate_types::{
    AlertState, DEFAULT_INTERVAL_MINUTES, DEFAULT_WINDOW, Error, MAX_HISTORY_SPAN_MINUTES,
    MAX_WINDOW, ROOM_COUNT, Reading, Result, RoomId, ThresholdConfig,
};

use crate::events::{EventDispatcher, EventReceiver, RoomEvent};
use crate::generator::{self, SeedRange};
use crate::history::History;
use crate::thresholds;

/// Construction parameters for a [`Registry`].
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    window: usize,
    interval: Duration,
    names: Vec<String>,
    thresholds: ThresholdConfig,
    seed_range: SeedRange,
    event_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            interval: Duration::minutes(DEFAULT_INTERVAL_MINUTES),
            names: default_names(),
            thresholds: ThresholdConfig::default(),
            seed_range: SeedRange::default(),
            event_capacity: 256,
        }
    }
}

impl RegistryConfig {
    /// Create a configuration with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the history window, clamped to `1..=MAX_WINDOW`.
    #[must_use]
    pub fn window(mut self, window: usize) -> Self {
        self.window = window.clamp(1, MAX_WINDOW);
        self
    }

    /// Set the spacing between history points and the sampling gate.
    ///
    /// Intervals shorter than one minute are ignored, since live points are
    /// stamped at minute resolution. So are intervals longer than
    /// `MAX_HISTORY_SPAN_MINUTES`.
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        if interval >= Duration::MINUTE
            && interval <= Duration::minutes(MAX_HISTORY_SPAN_MINUTES)
        {
            self.interval = interval;
        }
        self
    }

    /// Set room display names in id order. Missing names keep their default.
    #[must_use]
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for (slot, name) in self.names.iter_mut().zip(names) {
            *slot = name.into();
        }
        self
    }

    /// Set the initial thresholds.
    #[must_use]
    pub fn thresholds(mut self, thresholds: ThresholdConfig) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the ranges the back-fill starting points are drawn from.
    #[must_use]
    pub fn seed_range(mut self, seed_range: SeedRange) -> Self {
        self.seed_range = seed_range;
        self
    }

    /// Set the event channel capacity.
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// History window.
    pub fn window_len(&self) -> usize {
        self.window
    }

    /// Sampling interval.
    pub fn interval_duration(&self) -> Duration {
        self.interval
    }

    /// Display name of a room.
    pub fn name_of(&self, id: RoomId) -> &str {
        &self.names[id.index()]
    }
}

fn default_names() -> Vec<String> {
    RoomId::all().map(|id| format!("Room {id}")).collect()
}

/// Read-only view of one room, consistent as of a single point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomView {
    /// Room identifier.
    pub id: RoomId,
    /// Display name.
    pub name: String,
    /// The newest history entry.
    pub current: Reading,
    /// Alerts for `current` under the thresholds in effect at read time.
    pub alerts: AlertState,
    /// Every history entry, oldest first.
    pub history: Vec<Reading>,
}

/// Outcome of one tick for one room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomTick {
    /// Room identifier.
    pub id: RoomId,
    /// The point appended by this tick, if the gate was open.
    pub appended: Option<Reading>,
    /// The newest history entry after the tick.
    pub current: Reading,
    /// Alerts for `current` under the tick's threshold snapshot.
    pub alerts: AlertState,
}

/// Outcome of one tick across every room, in id order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    /// The `now` the tick was run with.
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    /// One entry per room, in id order.
    pub rooms: Vec<RoomTick>,
}

impl TickReport {
    /// Number of rooms that gained a point.
    pub fn appended_count(&self) -> usize {
        self.rooms.iter().filter(|r| r.appended.is_some()).count()
    }

    /// Rooms currently in the critical condition.
    pub fn critical_rooms(&self) -> Vec<RoomId> {
        self.rooms
            .iter()
            .filter(|r| r.alerts.critical)
            .map(|r| r.id)
            .collect()
    }
}

struct Room {
    id: RoomId,
    history: History,
    /// Alerts as of the previous tick, kept only to detect transitions.
    last_alerts: AlertState,
}

struct RoomsState {
    rooms: Vec<Room>,
    rng: StdRng,
}

/// Owner of the fixed set of rooms and the shared threshold configuration.
pub struct Registry {
    config: RegistryConfig,
    state: RwLock<RoomsState>,
    thresholds: RwLock<ThresholdConfig>,
    events: EventDispatcher,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("rooms", &ROOM_COUNT)
            .field("window", &self.config.window)
            .field("interval", &self.config.interval)
            .field("thresholds", &self.thresholds())
            .finish()
    }
}

impl Registry {
    /// Create a registry whose histories end at `now`, using OS entropy.
    pub fn new(now: OffsetDateTime, config: RegistryConfig) -> Self {
        Self::with_rng(now, config, StdRng::from_os_rng())
    }

    /// Create a registry with a fixed random seed for reproducible runs.
    pub fn with_seed(now: OffsetDateTime, config: RegistryConfig, seed: u64) -> Self {
        Self::with_rng(now, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(now: OffsetDateTime, config: RegistryConfig, mut rng: StdRng) -> Self {
        let thresholds = config.thresholds;
        let rooms = RoomId::all()
            .map(|id| {
                let history = History::initialize(
                    now,
                    config.window,
                    config.interval,
                    &config.seed_range,
                    &mut rng,
                );
                let last_alerts = history
                    .latest()
                    .map(|r| thresholds::evaluate(r, &thresholds))
                    .unwrap_or_default();
                Room {
                    id,
                    history,
                    last_alerts,
                }
            })
            .collect();

        info!(
            "Initialized {} rooms with {} points each ({} min spacing)",
            ROOM_COUNT,
            config.window,
            config.interval.whole_minutes()
        );

        Self {
            events: EventDispatcher::new(config.event_capacity),
            state: RwLock::new(RoomsState { rooms, rng }),
            thresholds: RwLock::new(thresholds),
            config,
        }
    }

    /// The configuration this registry was built with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Room ids in ascending order. Fixed for the registry's lifetime.
    pub fn list_room_ids(&self) -> Vec<RoomId> {
        RoomId::all().collect()
    }

    /// A copy of the thresholds currently in effect.
    pub fn thresholds(&self) -> ThresholdConfig {
        *self
            .thresholds
            .read()
            .expect("thresholds lock poisoned - a thread panicked while holding the lock")
    }

    /// Replace the thresholds in one atomic swap.
    ///
    /// The new values apply from the next tick or read; alert states already
    /// handed out are not touched.
    pub fn set_thresholds(&self, thresholds: ThresholdConfig) -> Result<()> {
        thresholds.validate()?;
        *self
            .thresholds
            .write()
            .expect("thresholds lock poisoned - a thread panicked while holding the lock") =
            thresholds;
        info!(
            "Thresholds set: temp_high={} hum_low={} co2_high={}",
            thresholds.temp_high, thresholds.hum_low, thresholds.co2_high
        );
        self.events.send(RoomEvent::ThresholdsChanged { thresholds });
        Ok(())
    }

    /// Subscribe to room events.
    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    /// Advance every room to `now`.
    ///
    /// For each room in id order: append a live point if the sampling gate is
    /// open, then re-derive the current reading and alerts. The whole pass
    /// holds the registry write lock and is all-or-nothing: if any room
    /// fails, no room is changed and no event is sent.
    pub fn tick(&self, now: OffsetDateTime) -> Result<TickReport> {
        let thresholds = self.thresholds();
        let interval = self.config.interval;
        let mut events = Vec::new();

        let report = {
            let mut state = self
                .state
                .write()
                .expect("registry lock poisoned - a thread panicked while holding the lock");
            let RoomsState { rooms, rng } = &mut *state;

            // Plan every room before touching any, so a failure leaves the
            // whole registry as it was.
            let mut planned = Vec::with_capacity(rooms.len());
            for room in rooms.iter() {
                let next = generator::plan_next(&room.history, now, interval, rng)
                    .inspect_err(|e| error!("Room {} failed to advance: {}", room.id, e))?;
                planned.push(next);
            }

            let mut ticks = Vec::with_capacity(rooms.len());
            for (room, appended) in rooms.iter_mut().zip(planned) {
                if let Some(reading) = appended {
                    room.history.append(reading)?;
                }
                let current = *room.history.latest()?;
                let alerts = thresholds::evaluate(&current, &thresholds);

                if let Some(reading) = appended {
                    debug!("Room {} appended {}", room.id, reading);
                    events.push(RoomEvent::ReadingAppended {
                        room: room.id,
                        reading,
                    });
                }

                if alerts != room.last_alerts {
                    if alerts.critical && !room.last_alerts.critical {
                        warn!("Room {} is critical: {}", room.id, current);
                    } else if !alerts.critical && room.last_alerts.critical {
                        info!("Room {} left the critical condition", room.id);
                    }
                    events.push(RoomEvent::AlertsChanged {
                        room: room.id,
                        previous: room.last_alerts.clone(),
                        current: alerts.clone(),
                    });
                    room.last_alerts = alerts.clone();
                }

                ticks.push(RoomTick {
                    id: room.id,
                    appended,
                    current,
                    alerts,
                });
            }

            TickReport {
                at: now,
                rooms: ticks,
            }
        };

        for event in events {
            self.events.send(event);
        }
        Ok(report)
    }

    /// Current reading, alerts and history of one room.
    ///
    /// Fails with [`Error::UnknownRoom`] for ids outside `1..=ROOM_COUNT`.
    pub fn room(&self, id: u8) -> Result<RoomView> {
        let id = RoomId::new(id)?;
        let thresholds = self.thresholds();
        let state = self
            .state
            .read()
            .expect("registry lock poisoned - a thread panicked while holding the lock");
        let room = state.rooms.get(id.index()).ok_or(Error::UnknownRoom(id.get()))?;
        self.view(room, &thresholds)
    }

    /// Views of every room in id order, taken from one consistent state.
    pub fn overview(&self) -> Result<Vec<RoomView>> {
        let thresholds = self.thresholds();
        let state = self
            .state
            .read()
            .expect("registry lock poisoned - a thread panicked while holding the lock");
        state
            .rooms
            .iter()
            .map(|room| self.view(room, &thresholds))
            .collect()
    }

    fn view(&self, room: &Room, thresholds: &ThresholdConfig) -> Result<RoomView> {
        let current = *room
            .history
            .latest()
            .inspect_err(|e| error!("Room {} has a corrupted history: {}", room.id, e))?;
        Ok(RoomView {
            id: room.id,
            name: self.config.name_of(room.id).to_string(),
            current,
            alerts: thresholds::evaluate(&current, thresholds),
            history: room.history.snapshot(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomclimate_types::AlertTag;
    use time::macros::datetime;

    const START: OffsetDateTime = datetime!(2025-06-01 12:00 UTC);

    fn registry() -> Registry {
        Registry::with_seed(START, RegistryConfig::default(), 42)
    }

    #[test]
    fn test_initial_state() {
        let registry = registry();
        let ids: Vec<u8> = registry.list_room_ids().into_iter().map(RoomId::get).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());

        for view in registry.overview().unwrap() {
            assert_eq!(view.history.len(), 48);
            assert_eq!(view.current.timestamp, START);
            assert_eq!(view.current, *view.history.last().unwrap());
            assert_eq!(view.name, format!("Room {}", view.id));
        }
    }

    #[test]
    fn test_unknown_room() {
        let registry = registry();
        assert_eq!(registry.room(0), Err(Error::UnknownRoom(0)));
        assert_eq!(registry.room(11), Err(Error::UnknownRoom(11)));
        assert!(registry.room(10).is_ok());
    }

    #[test]
    fn test_early_tick_is_suppressed() {
        let registry = registry();
        let before = registry.overview().unwrap();

        let report = registry.tick(START + Duration::seconds(5)).unwrap();
        assert_eq!(report.appended_count(), 0);
        assert_eq!(registry.overview().unwrap(), before);
    }

    #[test]
    fn test_gate_idempotence() {
        let registry = registry();
        let t1 = START + Duration::minutes(30);
        registry.tick(t1).unwrap();
        let after_first = registry.room(1).unwrap().history;

        registry.tick(t1 + Duration::minutes(10)).unwrap();
        registry.tick(t1 + Duration::minutes(29)).unwrap();
        assert_eq!(registry.room(1).unwrap().history, after_first);

        let report = registry.tick(t1 + Duration::minutes(30)).unwrap();
        assert_eq!(report.appended_count(), 10);
        let history = registry.room(1).unwrap().history;
        assert_eq!(history.len(), 48);
        assert_eq!(history[..47], after_first[1..]);
        assert_eq!(history.last().unwrap().timestamp, t1 + Duration::minutes(30));
    }

    #[test]
    fn test_live_points_are_minute_truncated() {
        let registry = registry();
        let now = START + Duration::minutes(45) + Duration::seconds(17);
        let report = registry.tick(now).unwrap();
        for room in &report.rooms {
            let appended = room.appended.expect("gate open");
            assert_eq!(appended.timestamp, START + Duration::minutes(45));
            assert_eq!(room.current, appended);
        }
    }

    #[test]
    fn test_rooms_are_independent_and_ordered() {
        let registry = registry();
        let report = registry.tick(START + Duration::hours(1)).unwrap();
        let ids: Vec<u8> = report.rooms.iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_histories() {
        let a = Registry::with_seed(START, RegistryConfig::default(), 9);
        let b = Registry::with_seed(START, RegistryConfig::default(), 9);
        let t = START + Duration::minutes(30);
        assert_eq!(a.tick(t).unwrap(), b.tick(t).unwrap());
        assert_eq!(a.overview().unwrap(), b.overview().unwrap());
    }

    #[test]
    fn test_set_thresholds_applies_on_next_read() {
        let registry = registry();
        let loose = ThresholdConfig::new(100.0, 0.0, 5000.0);
        let strict = ThresholdConfig::new(0.0, 100.0, 0.0);

        registry.set_thresholds(loose).unwrap();
        let returned = registry.room(1).unwrap().alerts;
        assert!(returned.is_clear());

        registry.set_thresholds(strict).unwrap();
        assert_eq!(registry.thresholds(), strict);

        let view = registry.room(1).unwrap();
        assert!(view.alerts.has(AlertTag::HighTemp));
        assert!(view.alerts.has(AlertTag::LowHumidity));
        assert!(view.alerts.has(AlertTag::HighCO2));
        assert!(view.alerts.critical);
        assert!(returned.is_clear());
    }

    #[test]
    fn test_set_thresholds_rejects_nan() {
        let registry = registry();
        let result = registry.set_thresholds(ThresholdConfig::new(f32::NAN, 30.0, 1000.0));
        assert!(matches!(result, Err(Error::InvalidThresholds(_))));
        assert_eq!(registry.thresholds(), ThresholdConfig::default());
    }

    #[test]
    fn test_custom_config() {
        let config = RegistryConfig::new()
            .window(12)
            .interval(Duration::minutes(10))
            .names(["Lab", "Office"]);
        let registry = Registry::with_seed(START, config, 1);

        let lab = registry.room(1).unwrap();
        assert_eq!(lab.name, "Lab");
        assert_eq!(lab.history.len(), 12);
        assert_eq!(registry.room(2).unwrap().name, "Office");
        assert_eq!(registry.room(3).unwrap().name, "Room 3");

        let report = registry.tick(START + Duration::minutes(10)).unwrap();
        assert_eq!(report.appended_count(), 10);
    }

    #[test]
    fn test_sub_minute_interval_is_ignored() {
        let config = RegistryConfig::new().interval(Duration::seconds(20));
        assert_eq!(config.interval_duration(), Duration::minutes(30));
        let config = RegistryConfig::new().window(0);
        assert_eq!(config.window_len(), 1);
    }

    #[test]
    fn test_oversized_interval_and_window_are_capped() {
        let config = RegistryConfig::new()
            .interval(Duration::minutes(4_000_000_000))
            .window(1_000_000);
        assert_eq!(config.interval_duration(), Duration::minutes(30));
        assert_eq!(config.window_len(), MAX_WINDOW);

        let registry = Registry::with_seed(START, config, 1);
        let view = registry.room(1).unwrap();
        assert_eq!(view.history.len(), MAX_WINDOW);
        assert_eq!(view.current.timestamp, START);
    }

    #[test]
    fn test_failed_tick_changes_nothing() {
        let registry = registry();
        registry
            .state
            .write()
            .unwrap()
            .rooms[5]
            .history = History::new(48);
        let mut events = registry.subscribe();
        let first = registry.room(1).unwrap();
        let last = registry.room(10).unwrap();

        // Room 6 fails after rooms 1-5 would have gained a point.
        let result = registry.tick(START + Duration::minutes(30));
        assert_eq!(result, Err(Error::EmptyHistory));

        assert_eq!(registry.room(1).unwrap(), first);
        assert_eq!(registry.room(10).unwrap(), last);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_events_on_append_and_threshold_change() {
        let registry = registry();
        let mut rx = registry.subscribe();

        registry
            .set_thresholds(ThresholdConfig::new(100.0, 0.0, 5000.0))
            .unwrap();
        registry.tick(START + Duration::minutes(30)).unwrap();
        let mut appended = 0;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, RoomEvent::ReadingAppended { .. }) {
                appended += 1;
            }
        }
        assert_eq!(appended, 10);

        registry
            .set_thresholds(ThresholdConfig::new(0.0, 100.0, 0.0))
            .unwrap();
        assert!(matches!(
            rx.recv().await.unwrap(),
            RoomEvent::ThresholdsChanged { .. }
        ));

        // Every room goes from no tags to all three.
        registry.tick(START + Duration::minutes(31)).unwrap();
        let mut changed = 0;
        while let Ok(event) = rx.try_recv() {
            if let RoomEvent::AlertsChanged { previous, current, .. } = event {
                assert!(previous.is_clear());
                assert!(current.critical);
                changed += 1;
            }
        }
        assert_eq!(changed, 10);
    }

    #[test]
    fn test_concurrent_readers_see_consistent_rooms() {
        let registry = std::sync::Arc::new(registry());
        let writer = {
            let registry = std::sync::Arc::clone(&registry);
            std::thread::spawn(move || {
                for i in 1..=50 {
                    registry.tick(START + Duration::minutes(30 * i)).unwrap();
                }
            })
        };

        for _ in 0..200 {
            for view in registry.overview().unwrap() {
                assert_eq!(view.current, *view.history.last().unwrap());
                assert!(view.history.len() <= 48);
            }
        }
        writer.join().unwrap();

        let views = registry.overview().unwrap();
        let tail = views[0].current.timestamp;
        assert!(views.iter().all(|v| v.current.timestamp == tail));
    }
}
