//! Dashboard rendering: the current reading panel and the history list
//!
//! The page has a fixed set of elements addressed by id. [`DashboardView`]
//! holds the content of each one; updates rewrite whole elements, nothing is
//! diffed.

use std::fmt;

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::reading::{Reading, Timestamp};

/// Markup shown in the history container when there are no readings
pub const HISTORY_PLACEHOLDER: &str = r#"<p class="placeholder">No readings yet</p>"#;

/// Text shown for a timestamp that does not resolve to a date
pub const INVALID_DATE: &str = "Invalid Date";

const LOCALE_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Status indicator on the dashboard. Only ever moves Waiting -> Active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusIndicator {
    #[default]
    Waiting,
    Active,
}

impl StatusIndicator {
    /// CSS classes of the `status` element
    pub fn class_name(&self) -> &'static str {
        match self {
            StatusIndicator::Waiting => "value status-indicator waiting",
            StatusIndicator::Active => "value status-indicator active",
        }
    }
}

impl fmt::Display for StatusIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusIndicator::Waiting => write!(f, "Waiting"),
            StatusIndicator::Active => write!(f, "Active"),
        }
    }
}

/// Pressure with two decimals. Missing or non-finite values render the way a
/// browser would print them.
pub fn format_pressure(pressure: Option<f64>) -> String {
    match pressure {
        Some(p) if p.is_finite() => format!("{:.2}", p),
        Some(p) if p == f64::INFINITY => "Infinity".to_string(),
        Some(p) if p == f64::NEG_INFINITY => "-Infinity".to_string(),
        _ => "NaN".to_string(),
    }
}

/// Timestamp in locale format, in the local time zone
pub fn format_timestamp(timestamp: Option<&Timestamp>) -> String {
    format_timestamp_in(timestamp, &Local)
}

/// Timestamp in locale format, in the given time zone
pub fn format_timestamp_in<Tz>(timestamp: Option<&Timestamp>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match timestamp.and_then(Timestamp::to_datetime) {
        Some(dt) => dt.with_timezone(tz).format(LOCALE_FORMAT).to_string(),
        None => INVALID_DATE.to_string(),
    }
}

/// `data:` URI for a base64 JPEG payload
pub fn image_data_uri(image_base64: &str) -> String {
    format!("data:image/jpeg;base64,{}", image_base64)
}

/// Escape text for use in HTML element content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Full markup of the history container for newest-first readings
pub fn render_history(readings: &[Reading]) -> String {
    if readings.is_empty() {
        return HISTORY_PLACEHOLDER.to_string();
    }

    readings
        .iter()
        .map(|reading| {
            format!(
                r#"<div class="history-item"><span class="history-time">{}</span><span class="history-pressure">{} PSI</span></div>"#,
                format_timestamp(reading.timestamp.as_ref()),
                format_pressure(reading.pressure)
            )
        })
        .collect()
}

/// Content of every dashboard element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub pressure_value: String,
    pub timestamp: String,
    pub gauge_image_src: Option<String>,
    pub placeholder_visible: bool,
    pub status: StatusIndicator,
    pub history_html: String,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            pressure_value: "--".to_string(),
            timestamp: "--".to_string(),
            gauge_image_src: None,
            placeholder_visible: true,
            status: StatusIndicator::Waiting,
            history_html: HISTORY_PLACEHOLDER.to_string(),
        }
    }
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `reading` as the current reading and mark the dashboard active.
    /// An absent image leaves the previous image in place.
    pub fn update_current_reading(&mut self, reading: &Reading) {
        self.pressure_value = format_pressure(reading.pressure);
        self.timestamp = format_timestamp(reading.timestamp.as_ref());

        if let Some(image) = reading.image.as_deref() {
            self.gauge_image_src = Some(image_data_uri(image));
            self.placeholder_visible = false;
        }

        self.status = StatusIndicator::Active;
    }

    /// Replace the history list
    pub fn update_history(&mut self, readings: &[Reading]) {
        self.history_html = render_history(readings);
    }

    /// Apply a newest-first snapshot from a subscription
    pub fn apply_snapshot(&mut self, snapshot: &[Reading]) {
        self.update_history(snapshot);
        if let Some(latest) = snapshot.first() {
            self.update_current_reading(latest);
        }
    }
}

/// Whole dashboard page. The page re-reads `/api/view` every
/// `refresh_interval_seconds`.
pub fn render_page(view: &DashboardView, refresh_interval_seconds: u64) -> String {
    let image_src = view
        .gauge_image_src
        .as_deref()
        .map(|src| format!(r#" src="{}""#, escape_html(src)))
        .unwrap_or_default();
    let image_class = if view.gauge_image_src.is_some() {
        "gauge-image visible"
    } else {
        "gauge-image"
    };
    let placeholder_display = if view.placeholder_visible {
        "block"
    } else {
        "none"
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Pressure Watcher</title>
    <style>
        .gauge-image {{ display: none; max-width: 100%; border-radius: 0.25rem; }}
        .gauge-image.visible {{ display: block; }}
        .status-indicator {{ display: inline-block; padding: 0.25em 0.6em; border-radius: 0.25rem; font-weight: 600; }}
        .status-indicator.waiting {{ color: #383d41; background-color: #e2e3e5; }}
        .status-indicator.active {{ color: #155724; background-color: #d4edda; }}
        .history-item {{ display: flex; justify-content: space-between; padding: 0.5rem; border-bottom: 1px solid #dee2e6; }}
        .placeholder {{ color: #6c757d; }}
    </style>
    <script>
        function refreshView() {{
            fetch('/api/view')
                .then(r => r.json())
                .then(view => {{
                    document.getElementById('pressureValue').textContent = view.pressure_value;
                    document.getElementById('timestamp').textContent = view.timestamp;
                    const img = document.getElementById('gaugeImage');
                    if (view.gauge_image_src) {{
                        img.src = view.gauge_image_src;
                        img.classList.add('visible');
                    }}
                    document.getElementById('noImagePlaceholder').style.display =
                        view.placeholder_visible ? 'block' : 'none';
                    const status = document.getElementById('status');
                    status.textContent = view.status;
                    status.className = 'value status-indicator ' + view.status.toLowerCase();
                    document.getElementById('historyContainer').innerHTML = view.history_html;
                }});
        }}
        setInterval(refreshView, {refresh_ms});
    </script>
</head>
<body style="font-family: system-ui, sans-serif; max-width: 960px; margin: 0 auto; padding: 1rem;">
    <h1>Pressure Watcher</h1>
    <section>
        <h2>Current Reading</h2>
        <img id="gaugeImage" class="{image_class}"{image_src} alt="Pressure gauge">
        <div id="noImagePlaceholder" class="placeholder" style="display: {placeholder_display};">No image available</div>
        <p>Pressure: <span id="pressureValue" class="value">{pressure}</span> PSI</p>
        <p>Last Update: <span id="timestamp" class="value">{timestamp}</span></p>
        <p>Status: <span id="status" class="{status_class}">{status}</span></p>
    </section>
    <section>
        <h2>History</h2>
        <div id="historyContainer">{history}</div>
    </section>
</body>
</html>"#,
        refresh_ms = refresh_interval_seconds.max(1) * 1000,
        image_class = image_class,
        image_src = image_src,
        placeholder_display = placeholder_display,
        pressure = escape_html(&view.pressure_value),
        timestamp = escape_html(&view.timestamp),
        status_class = view.status.class_name(),
        status = view.status,
        history = view.history_html,
    )
}
