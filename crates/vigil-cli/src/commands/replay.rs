//! Replay recorded traces through fresh sessions

use super::helpers::{parse_trace, print_stats, TraceFrame};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{Table, Tabled};
use uuid::Uuid;
use vigil_core::{Decision, SessionRegistry, SessionSettings, SessionStats};

#[derive(Tabled)]
struct DecisionRow {
    #[tabled(rename = "T+")]
    offset: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Intervention")]
    category: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Streak")]
    streak: u32,
}

struct ReplayOutcome {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    decisions: Vec<Decision>,
    stats: SessionStats,
}

/// Replay each trace file in its own session, concurrently
///
/// # Errors
///
/// Returns an error if a file cannot be read or parsed
pub async fn replay_command(
    files: Vec<PathBuf>,
    settings: SessionSettings,
    json: bool,
    all: bool,
) -> Result<()> {
    if files.is_empty() {
        anyhow::bail!("No trace files given");
    }

    let registry = Arc::new(SessionRegistry::new());
    let started_at = Utc::now();

    let handles: Vec<_> = files
        .into_iter()
        .map(|path| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                let outcome = replay_file(&registry, &path, settings, started_at).await;
                (path, outcome)
            })
        })
        .collect();

    for handle in handles {
        let (path, outcome) = handle.await.context("Replay task failed")?;
        let outcome = outcome?;
        if json {
            print_json(&path, &outcome, all)?;
        } else {
            print_table(&path, &outcome, all);
        }
    }

    Ok(())
}

async fn replay_file(
    registry: &SessionRegistry,
    path: &Path,
    settings: SessionSettings,
    started_at: DateTime<Utc>,
) -> Result<ReplayOutcome> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read trace {}", path.display()))?;
    let frames: Vec<TraceFrame> =
        parse_trace(&contents).with_context(|| format!("Failed to parse {}", path.display()))?;
    log::info!("Replaying {} frames from {}", frames.len(), path.display());

    let session_id = registry.create(settings, started_at)?;
    let mut decisions = Vec::with_capacity(frames.len());
    let mut last = started_at;
    for frame in &frames {
        // untimed frames advance one second
        let now = frame.timestamp(started_at, last + Duration::seconds(1));
        decisions.push(registry.tick(session_id, &frame.observation, now)?);
        last = now;
    }
    let stats = registry.end(session_id, last)?;

    Ok(ReplayOutcome {
        session_id,
        started_at,
        decisions,
        stats,
    })
}

#[allow(clippy::cast_precision_loss)]
fn print_table(path: &Path, outcome: &ReplayOutcome, all: bool) {
    println!("\n{} (session {})", path.display(), outcome.session_id);

    let rows: Vec<DecisionRow> = outcome
        .decisions
        .iter()
        .filter(|d| all || d.should_intervene)
        .map(|d| DecisionRow {
            offset: format!(
                "{:.1}s",
                (d.timestamp - outcome.started_at).num_milliseconds() as f64 / 1000.0
            ),
            status: d.status.to_string(),
            category: d.category.to_string(),
            severity: d.severity.to_string(),
            streak: d.focus_streak,
        })
        .collect();

    if rows.is_empty() {
        println!("No interventions.");
    } else {
        let table = Table::new(rows).to_string();
        println!("{table}");
    }
    println!();
    print_stats(&outcome.stats);
}

fn print_json(path: &Path, outcome: &ReplayOutcome, all: bool) -> Result<()> {
    for decision in outcome
        .decisions
        .iter()
        .filter(|d| all || d.should_intervene)
    {
        let line = serde_json::json!({
            "file": path.display().to_string(),
            "session": outcome.session_id,
            "decision": decision,
        });
        println!("{}", serde_json::to_string(&line)?);
    }
    let summary = serde_json::json!({
        "file": path.display().to_string(),
        "session": outcome.session_id,
        "stats": outcome.stats,
    });
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}
