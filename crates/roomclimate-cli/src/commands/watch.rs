//! Watch command implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use roomclimate_core::{
    Clock, Driver, DriverOptions, EventReceiver, Registry, RoomEvent, ScaledClock, SystemClock,
};
use roomclimate_types::RoomId;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, csv_escape, format_event_line, format_timestamp};
use crate::util::append_output;

/// Arguments for the watch command.
#[derive(Debug, Clone)]
pub struct WatchArgs {
    /// Wall time between ticks.
    pub refresh: Duration,
    /// Ticks before exiting; 0 runs until interrupted.
    pub count: u64,
    /// Simulated seconds per wall second.
    pub time_scale: f64,
}

pub async fn cmd_watch(
    registry: Arc<Registry>,
    args: WatchArgs,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
    quiet: bool,
) -> Result<()> {
    let clock = Arc::new(ScaledClock::new(SystemClock.now(), args.time_scale));
    let driver = Driver::new(
        Arc::clone(&registry),
        clock,
        DriverOptions::default()
            .cadence(args.refresh)
            .max_ticks(args.count),
    );

    if !quiet {
        eprintln!(
            "Watching {} rooms (refresh: {}s, time scale: {}x). Press Ctrl+C to stop.",
            registry.list_room_ids().len(),
            args.refresh.as_secs_f64(),
            args.time_scale
        );
    }

    let cancel = CancellationToken::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nShutting down...");
        }
        signal.cancel();
    });

    if format == OutputFormat::Csv {
        append_output(output, "timestamp,room,name,temperature,humidity,co2\n")?;
    }

    let mut events = registry.subscribe();
    let names = |id: u8| {
        RoomId::new(id)
            .map(|room| registry.config().name_of(room).to_string())
            .unwrap_or_else(|_| format!("Room {id}"))
    };

    let ticks = driver
        .run(cancel.clone(), |_report| {
            let content = drain_events(&mut events, format, &names, opts);
            if !content.is_empty()
                && let Err(e) = append_output(output, &content)
            {
                warn!("Failed to write watch output: {e:#}");
            }
        })
        .await
        .context("Simulation tick failed")?;

    cancel.cancel();
    if !quiet {
        eprintln!("Stopped after {} tick(s)", ticks);
    }
    Ok(())
}

/// Render every event queued since the last tick.
fn drain_events(
    events: &mut EventReceiver,
    format: OutputFormat,
    names: &dyn Fn(u8) -> String,
    opts: &FormatOptions,
) -> String {
    use tokio::sync::broadcast::error::TryRecvError;

    let mut out = String::new();
    loop {
        match events.try_recv() {
            Ok(event) => out.push_str(&render_event(&event, format, names, opts)),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!("Watch output fell behind, skipped {} event(s)", skipped);
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    out
}

fn render_event(
    event: &RoomEvent,
    format: OutputFormat,
    names: &dyn Fn(u8) -> String,
    opts: &FormatOptions,
) -> String {
    match format {
        OutputFormat::Text => format_event_line(event, names, opts),
        OutputFormat::Json => match serde_json::to_string(event) {
            Ok(line) => line + "\n",
            Err(e) => {
                warn!("Failed to serialize event: {e}");
                String::new()
            }
        },
        OutputFormat::Csv => match event {
            RoomEvent::ReadingAppended { room, reading } => format!(
                "{},{},{},{:.1},{},{}\n",
                format_timestamp(reading.timestamp),
                room,
                csv_escape(&names(room.get())),
                reading.temperature,
                reading.humidity,
                reading.co2
            ),
            _ => String::new(),
        },
    }
}
