//! End-to-end simulation tests for roomclimate-core.
//!
//! These drive a registry through simulated days with a manual clock and
//! check the history, gating and alerting behavior seen by a consumer.

use std::sync::Arc;

use roomclimate_core::{
    AlertTag, Clock, Driver, DriverOptions, ManualClock, Reading, Registry, RegistryConfig,
    RoomEvent, ThresholdConfig,
};
use time::Duration;
use time::macros::datetime;
use tokio_util::sync::CancellationToken;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("roomclimate_core=debug")
        .try_init();
}

#[test]
fn test_full_day_replaces_whole_history() {
    init_tracing();
    let start = datetime!(2025-06-01 08:00 UTC);
    let registry = Registry::with_seed(start, RegistryConfig::default(), 2024);
    let initial = registry.room(4).unwrap().history;

    let clock = ManualClock::new(start);
    for _ in 0..48 {
        clock.advance(Duration::minutes(30));
        let report = registry.tick(clock.now()).unwrap();
        assert_eq!(report.appended_count(), 10);
    }

    let history = registry.room(4).unwrap().history;
    assert_eq!(history.len(), 48);
    assert!(history.iter().all(|r| r.timestamp > initial.last().unwrap().timestamp));
    assert_eq!(history.first().unwrap().timestamp, start + Duration::minutes(30));
    assert_eq!(history.last().unwrap().timestamp, start + Duration::hours(24));
}

#[test]
fn test_polling_faster_than_gate() {
    init_tracing();
    let start = datetime!(2025-06-01 08:00 UTC);
    let registry = Registry::with_seed(start, RegistryConfig::default(), 7);
    let clock = ManualClock::new(start);

    // Poll every 5 seconds for two simulated hours.
    let mut appended = 0;
    for _ in 0..(2 * 60 * 12) {
        clock.advance(Duration::seconds(5));
        appended += registry.tick(clock.now()).unwrap().appended_count();
    }

    // One point per room per 30 minutes.
    assert_eq!(appended, 4 * 10);

    let history = registry.room(1).unwrap().history;
    for pair in history.windows(2).skip(43) {
        assert!(pair[1].timestamp - pair[0].timestamp >= Duration::minutes(30));
    }
}

#[test]
fn test_alert_examples() {
    let reading = Reading::new(datetime!(2025-06-01 08:00 UTC), 31.0, 40, 1100);
    let thresholds = ThresholdConfig::new(30.0, 30.0, 1000.0);
    let alerts = roomclimate_core::evaluate(&reading, &thresholds);
    assert_eq!(
        alerts.tags.iter().copied().collect::<Vec<_>>(),
        vec![AlertTag::HighTemp, AlertTag::HighCO2]
    );
    assert!(alerts.critical);

    let reading = Reading::new(datetime!(2025-06-01 08:00 UTC), 29.0, 20, 1100);
    let alerts = roomclimate_core::evaluate(&reading, &thresholds);
    assert_eq!(
        alerts.tags.iter().copied().collect::<Vec<_>>(),
        vec![AlertTag::LowHumidity, AlertTag::HighCO2]
    );
    assert!(!alerts.critical);
}

#[test]
fn test_looser_thresholds_never_add_tags() {
    let start = datetime!(2025-06-01 08:00 UTC);
    let registry = Registry::with_seed(start, RegistryConfig::default(), 99);
    let before = registry.overview().unwrap();

    registry
        .set_thresholds(ThresholdConfig::new(33.0, 20.0, 1300.0))
        .unwrap();
    let after = registry.overview().unwrap();

    for (b, a) in before.iter().zip(&after) {
        assert_eq!(a.current, b.current);
        assert!(a.alerts.tags.is_subset(&b.alerts.tags));
    }
}

#[tokio::test(start_paused = true)]
async fn test_driver_with_event_subscriber() {
    init_tracing();
    let start = datetime!(2025-06-01 08:00 UTC);
    let registry = Arc::new(Registry::with_seed(start, RegistryConfig::default(), 3));
    let clock = Arc::new(ManualClock::new(start + Duration::minutes(30)));
    let mut events = registry.subscribe();

    let driver = Driver::new(
        Arc::clone(&registry),
        clock,
        DriverOptions::default().max_ticks(2),
    );
    let ticks = driver.run(CancellationToken::new(), |_| {}).await.unwrap();
    assert_eq!(ticks, 2);

    let mut rooms_appended = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let RoomEvent::ReadingAppended { room, .. } = event {
            rooms_appended.push(room.get());
        }
    }
    assert_eq!(rooms_appended, (1..=10).collect::<Vec<u8>>());
}
