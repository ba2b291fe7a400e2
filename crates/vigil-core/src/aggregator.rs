use crate::duration::elapsed_secs;
use crate::policy::Decision;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Running statistics for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_decisions: usize,
    pub total_interventions: usize,
    /// Interventions per decision, 0 with no history
    pub intervention_rate: f64,
    pub focus_streak: u32,
    pub longest_focus_streak: u32,
    pub total_away_ticks: u64,
    pub total_distracted_ticks: u64,
    pub focus_percentage: f64,
    pub session_duration_secs: f64,
}

impl SessionStats {
    #[must_use]
    pub fn session_duration_minutes(&self) -> f64 {
        self.session_duration_secs / 60.0
    }
}

/// Append-only decision log with statistics over the whole session
#[derive(Debug, Clone)]
pub struct SessionAggregator {
    started_at: DateTime<Utc>,
    history: Vec<Decision>,
}

impl SessionAggregator {
    #[must_use]
    pub const fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            history: Vec::new(),
        }
    }

    pub fn record(&mut self, decision: Decision) {
        self.history.push(decision);
    }

    #[must_use]
    pub fn history(&self) -> &[Decision] {
        &self.history
    }

    #[must_use]
    pub fn last(&self) -> Option<&Decision> {
        self.history.last()
    }

    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Statistics with session time measured up to the latest decision
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        let until = self.last().map_or(self.started_at, |d| d.timestamp);
        self.stats_at(until)
    }

    /// Statistics with session time measured up to `now`
    ///
    /// Away and distracted tick counts are weighed against elapsed seconds,
    /// which assumes roughly one tick per second.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats_at(&self, now: DateTime<Utc>) -> SessionStats {
        let total_decisions = self.history.len();
        let total_interventions = self.history.iter().filter(|d| d.should_intervene).count();
        let intervention_rate = if total_decisions == 0 {
            0.0
        } else {
            total_interventions as f64 / total_decisions as f64
        };

        let total_away_ticks = self.history.iter().filter(|d| d.status.is_away()).count() as u64;
        let total_distracted_ticks = self
            .history
            .iter()
            .filter(|d| d.status.is_inattentive())
            .count() as u64;

        let focus_streak = self.last().map_or(0, |d| d.focus_streak);
        let longest_focus_streak = self
            .history
            .iter()
            .map(|d| d.focus_streak)
            .max()
            .unwrap_or(0);

        let session_duration_secs = elapsed_secs(self.started_at, now).max(0.0);
        let lost = (total_away_ticks + total_distracted_ticks) as f64;
        let focus_percentage = (100.0 - lost / session_duration_secs.max(1.0) * 100.0).max(0.0);

        SessionStats {
            total_decisions,
            total_interventions,
            intervention_rate,
            focus_streak,
            longest_focus_streak,
            total_away_ticks,
            total_distracted_ticks,
            focus_percentage,
            session_duration_secs,
        }
    }
}
