//! Helper utility functions for CLI commands

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::path::Path;
use vigil_core::config::default_config_path;
use vigil_core::{Observation, SessionSettings, SessionStats, Strictness, VigilConfig};

/// Largest accepted `t` offset, one leap year
pub const MAX_OFFSET_SECS: f64 = 366.0 * 24.0 * 3600.0;

/// One line of a recorded trace
///
/// `at` wins over `t` (seconds since the trace started). With neither, the
/// caller picks the timestamp.
#[derive(Debug, Clone, Deserialize)]
pub struct TraceFrame {
    #[serde(default)]
    pub t: Option<f64>,
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub observation: Observation,
}

impl TraceFrame {
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn timestamp(&self, base: DateTime<Utc>, fallback: DateTime<Utc>) -> DateTime<Utc> {
        if let Some(at) = self.at {
            return at;
        }
        self.t
            .filter(|t| t.is_finite())
            .and_then(|t| Duration::try_milliseconds((t * 1000.0).round() as i64))
            .and_then(|offset| base.checked_add_signed(offset))
            .unwrap_or(fallback)
    }
}

/// Parse one JSON frame, rejecting offsets outside `0..=MAX_OFFSET_SECS`
///
/// # Errors
///
/// Returns an error if the line is not a frame or its offset is out of range
pub fn parse_frame(line: &str) -> Result<TraceFrame> {
    let frame: TraceFrame = serde_json::from_str(line)?;
    if let Some(t) = frame.t {
        if !(0.0..=MAX_OFFSET_SECS).contains(&t) {
            anyhow::bail!("Offset t={t} is outside 0..={MAX_OFFSET_SECS}s");
        }
    }
    Ok(frame)
}

/// Parse a JSON-lines trace, skipping blank lines and `#` comments
///
/// # Errors
///
/// Returns an error naming the first line that does not parse
pub fn parse_trace(contents: &str) -> Result<Vec<TraceFrame>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(idx, line)| {
            parse_frame(line).with_context(|| format!("Invalid frame on line {}", idx + 1))
        })
        .collect()
}

/// Session settings from the config file, with an optional strictness override
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read
pub fn resolve_settings(config: Option<&Path>, strictness: Option<i64>) -> Result<SessionSettings> {
    let path = match config {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };
    let mut settings = VigilConfig::load(&path)?.session;
    if let Some(level) = strictness {
        settings.strictness = Strictness::new(level);
    }
    Ok(settings)
}

/// Format seconds as "1h 02m 03s" / "2m 03s" / "3s"
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

pub fn print_stats(stats: &SessionStats) {
    println!("Decisions:       {}", stats.total_decisions);
    println!(
        "Interventions:   {} ({:.1}% of ticks)",
        stats.total_interventions,
        stats.intervention_rate * 100.0
    );
    println!("Focus:           {:.1}%", stats.focus_percentage);
    println!(
        "Focus streak:    {} (longest {})",
        stats.focus_streak, stats.longest_focus_streak
    );
    println!("Away ticks:      {}", stats.total_away_ticks);
    println!("Distracted ticks: {}", stats.total_distracted_ticks);
    println!(
        "Duration:        {}",
        format_duration(stats.session_duration_secs)
    );
}
