//! Per-room climate telemetry simulation and alerting engine.
//!
//! This crate maintains a bounded rolling history of temperature, humidity
//! and CO₂ readings for a fixed set of rooms, advances it with a bounded
//! random walk, and classifies each room's newest reading against shared
//! thresholds.
//!
//! # Features
//!
//! - **History store**: capacity-bounded, strictly time-ordered per room
//! - **Reading generator**: random walk with clamping and a sampling gate
//! - **Threshold evaluator**: pure alert tags plus a compound critical flag
//! - **Room registry**: atomic ticks, consistent reads, hot-swappable thresholds
//! - **Driver**: async periodic ticking from any [`Clock`]
//! - **Events**: broadcast notifications for new points and alert changes
//!
//! # Quick Start
//!
//! ```
//! use roomclimate_core::{Registry, RegistryConfig, ThresholdConfig};
//! use time::{Duration, OffsetDateTime};
//!
//! let now = OffsetDateTime::now_utc();
//! let registry = Registry::new(now, RegistryConfig::default());
//!
//! registry.tick(now + Duration::minutes(30)).unwrap();
//! registry.set_thresholds(ThresholdConfig::new(28.0, 35.0, 900.0)).unwrap();
//!
//! for id in registry.list_room_ids() {
//!     let room = registry.room(id.get()).unwrap();
//!     println!("{}: {} ({})", room.name, room.current, room.alerts);
//! }
//! ```

pub mod clock;
pub mod driver;
pub mod events;
pub mod generator;
pub mod history;
pub mod registry;
pub mod thresholds;

// Core exports
pub use clock::{Clock, ManualClock, ScaledClock, SystemClock};
pub use driver::{Driver, DriverOptions};
pub use events::{EventDispatcher, EventReceiver, EventSender, RoomEvent};
pub use generator::{SeedRange, StepMagnitude};
pub use history::History;
pub use registry::{Registry, RegistryConfig, RoomTick, RoomView, TickReport};
pub use thresholds::evaluate;

// Re-export from roomclimate-types
pub use roomclimate_types::{
    AlertState, AlertTag, Error, Reading, Result, RoomId, ThresholdConfig,
};
