//! Periodic tick driver.
//!
//! Calls [`Registry::tick`] on a fixed wall-clock cadence, taking the
//! timestamp from a [`Clock`]. The cadence is independent of the 30-minute
//! sampling gate: most ticks only re-derive alerts.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use roomclimate_types::Result;

use crate::clock::Clock;
use crate::registry::{Registry, TickReport};

/// Options for [`Driver`].
#[derive(Debug, Clone, Copy)]
pub struct DriverOptions {
    /// Wall time between ticks.
    pub cadence: Duration,
    /// Stop after this many ticks (`None` runs until cancelled).
    pub max_ticks: Option<u64>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            cadence: Duration::from_secs(5),
            max_ticks: None,
        }
    }
}

impl DriverOptions {
    /// Set the wall time between ticks. Zero is treated as one millisecond.
    #[must_use]
    pub fn cadence(mut self, cadence: Duration) -> Self {
        self.cadence = cadence.max(Duration::from_millis(1));
        self
    }

    /// Stop after `count` ticks. Zero means no limit.
    #[must_use]
    pub fn max_ticks(mut self, count: u64) -> Self {
        self.max_ticks = (count > 0).then_some(count);
        self
    }
}

/// Drives a registry from a clock until cancelled.
pub struct Driver {
    registry: Arc<Registry>,
    clock: Arc<dyn Clock>,
    options: DriverOptions,
}

impl Driver {
    /// Create a driver.
    pub fn new(registry: Arc<Registry>, clock: Arc<dyn Clock>, options: DriverOptions) -> Self {
        Self {
            registry,
            clock,
            options,
        }
    }

    /// Run one tick immediately.
    pub fn tick_once(&self) -> Result<TickReport> {
        self.registry.tick(self.clock.now())
    }

    /// Tick on the configured cadence until `cancel` fires or the tick limit
    /// is reached, calling `on_tick` with every report.
    ///
    /// The first tick happens immediately. Returns the number of ticks run.
    pub async fn run<F>(&self, cancel: CancellationToken, mut on_tick: F) -> Result<u64>
    where
        F: FnMut(&TickReport),
    {
        let mut timer = interval(self.options.cadence);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = 0u64;

        info!(
            "Driver started (cadence: {:?}, limit: {:?})",
            self.options.cadence, self.options.max_ticks
        );

        loop {
            if self.options.max_ticks.is_some_and(|max| ticks >= max) {
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Driver cancelled");
                    break;
                }
                _ = timer.tick() => {
                    let report = self.tick_once()?;
                    ticks += 1;
                    if report.appended_count() > 0 {
                        debug!(
                            "Tick {} at {}: {} room(s) gained a point",
                            ticks,
                            report.at,
                            report.appended_count()
                        );
                    }
                    on_tick(&report);
                }
            }
        }

        info!("Driver stopped after {} tick(s)", ticks);
        Ok(ticks)
    }
}
