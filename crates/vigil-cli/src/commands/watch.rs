//! Live mode: one observation per stdin line, interventions as they fire

use super::helpers::{parse_frame, print_stats};
use crate::render::{ConsoleSink, JsonSink};
use anyhow::{Context, Result};
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;
use vigil_core::{dispatch, DecisionSink, Session, SessionSettings};

/// Feed stdin frames into one session until EOF
///
/// Malformed lines are logged and skipped.
///
/// # Errors
///
/// Returns an error if stdin cannot be read
pub async fn watch_command(settings: SessionSettings, bell: bool, json: bool) -> Result<()> {
    let sinks: Vec<Box<dyn DecisionSink>> = if json {
        vec![Box::new(JsonSink)]
    } else {
        vec![Box::new(ConsoleSink::new(bell))]
    };

    let started_at = Utc::now();
    let mut session = Session::with_settings(Uuid::new_v4(), settings, started_at);
    if !json {
        println!(
            "Watching stdin (session {}, strictness {}). Ctrl-D to stop.",
            session.id(),
            settings.strictness
        );
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut skipped = 0_usize;
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let frame = match parse_frame(line) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Skipping malformed frame: {e:#}");
                skipped += 1;
                continue;
            }
        };

        let now = frame.timestamp(started_at, Utc::now());
        let decision = session.tick(&frame.observation, now);
        let report = dispatch(&sinks, &decision);
        if report.failed > 0 {
            log::error!("Delivery failed: {}", report.errors.join("; "));
        }
    }

    let stats = session.end(Utc::now());
    if json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        println!();
        print_stats(&stats);
        if skipped > 0 {
            println!("Skipped {skipped} malformed line(s)");
        }
    }
    Ok(())
}
