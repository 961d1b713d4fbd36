//! Output formatting utilities for text, JSON, and CSV output.

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use time::OffsetDateTime;
use time::macros::format_description;

use roomclimate_core::{RoomEvent, RoomView};
use roomclimate_types::{AlertState, AlertTag, Reading};

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool) -> Self {
        Self { no_color }
    }
}

/// Format a timestamp as `YYYY-MM-DD HH:MM`.
#[must_use]
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    ts.format(&format).unwrap_or_else(|_| ts.to_string())
}

/// Format one alert tag, colored by hazard class.
#[must_use]
pub fn format_tag(tag: AlertTag, no_color: bool) -> String {
    let label = tag.label();
    if no_color {
        return label.to_string();
    }
    match tag {
        AlertTag::HighTemp => label.red().to_string(),
        AlertTag::LowHumidity => label.blue().to_string(),
        AlertTag::HighCO2 => label.yellow().to_string(),
    }
}

/// Format an alert state: tags, a critical marker, or "No alerts".
#[must_use]
pub fn format_alerts(alerts: &AlertState, no_color: bool) -> String {
    if alerts.is_clear() {
        return if no_color {
            "No alerts".to_string()
        } else {
            "No alerts".dimmed().to_string()
        };
    }

    let mut out = alerts
        .tags
        .iter()
        .map(|tag| format_tag(*tag, no_color))
        .collect::<Vec<_>>()
        .join(", ");
    if alerts.critical {
        out.push(' ');
        if no_color {
            out.push_str("CRITICAL");
        } else {
            out.push_str(&"CRITICAL".red().bold().to_string());
        }
    }
    out
}

fn format_reading_values(reading: &Reading) -> String {
    format!(
        "{:>5.1} °C  {:>3} %  {:>5} ppm",
        reading.temperature, reading.humidity, reading.co2
    )
}

/// Format the overview as one line per room.
#[must_use]
pub fn format_status_text(views: &[RoomView], opts: &FormatOptions) -> String {
    let width = views.iter().map(|v| v.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for view in views {
        let name = if opts.no_color {
            format!("{:<width$}", view.name)
        } else {
            format!("{:<width$}", view.name).cyan().to_string()
        };
        out.push_str(&format!(
            "{:>2}  {}  {}  {}\n",
            view.id.get(),
            name,
            format_reading_values(&view.current),
            format_alerts(&view.alerts, opts.no_color)
        ));
    }
    out
}

/// Format the overview as CSV, one row per room.
#[must_use]
pub fn format_status_csv(views: &[RoomView]) -> String {
    let mut out =
        String::from("id,name,timestamp,temperature,humidity,co2,high_temp,low_humidity,high_co2,critical\n");
    for view in views {
        let r = &view.current;
        out.push_str(&format!(
            "{},{},{},{:.1},{},{},{},{},{},{}\n",
            view.id,
            csv_escape(&view.name),
            format_timestamp(r.timestamp),
            r.temperature,
            r.humidity,
            r.co2,
            view.alerts.has(AlertTag::HighTemp),
            view.alerts.has(AlertTag::LowHumidity),
            view.alerts.has(AlertTag::HighCO2),
            view.alerts.critical,
        ));
    }
    out
}

/// Format one room with its history, newest first.
#[must_use]
pub fn format_room_text(view: &RoomView, opts: &FormatOptions) -> String {
    let title = format!("{} (room {})", view.name, view.id);
    let mut out = if opts.no_color {
        format!("{}\n", title)
    } else {
        format!("{}\n", title.bold())
    };
    out.push_str(&format!(
        "Now:     {}  at {}\n",
        format_reading_values(&view.current),
        format_timestamp(view.current.timestamp)
    ));
    out.push_str(&format!(
        "Alerts:  {}\n\n",
        format_alerts(&view.alerts, opts.no_color)
    ));

    out.push_str(&format!("History ({} points, newest first)\n", view.history.len()));
    out.push_str(&format!("{}\n", "-".repeat(46)));
    for reading in view.history.iter().rev() {
        out.push_str(&format!(
            "{}  {}\n",
            format_timestamp(reading.timestamp),
            format_reading_values(reading)
        ));
    }
    out
}

/// Format one room's history as CSV, oldest first.
#[must_use]
pub fn format_room_csv(view: &RoomView) -> String {
    let mut out = String::from("timestamp,temperature,humidity,co2\n");
    for r in &view.history {
        out.push_str(&format!(
            "{},{:.1},{},{}\n",
            format_timestamp(r.timestamp),
            r.temperature,
            r.humidity,
            r.co2
        ));
    }
    out
}

/// Format a room event for the watch stream.
#[must_use]
pub fn format_event_line(event: &RoomEvent, names: &dyn Fn(u8) -> String, opts: &FormatOptions) -> String {
    match event {
        RoomEvent::ReadingAppended { room, reading } => format!(
            "[{}] {}: {}\n",
            format_timestamp(reading.timestamp),
            names(room.get()),
            format_reading_values(reading)
        ),
        RoomEvent::AlertsChanged { room, current, .. } => format!(
            "{}: {}\n",
            names(room.get()),
            format_alerts(current, opts.no_color)
        ),
        RoomEvent::ThresholdsChanged { thresholds } => format!(
            "Thresholds: temp > {} °C, humidity < {} %, CO₂ > {} ppm\n",
            thresholds.temp_high, thresholds.hum_low, thresholds.co2_high
        ),
        _ => String::new(),
    }
}

/// Serialize any value as pretty JSON followed by a newline.
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)? + "\n")
}

/// Escape a CSV field if it contains special characters.
#[must_use]
pub fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
