#[cfg(test)]
mod tests;

use crate::classifier::DisciplineStatus;
use crate::duration::elapsed_secs;
use crate::signal::PerceptionSignal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Lowest and highest accepted strictness
pub const MIN_STRICTNESS: u8 = 1;
pub const MAX_STRICTNESS: u8 = 10;
pub const DEFAULT_STRICTNESS: u8 = 5;

/// Cooldown is `max(MIN_COOLDOWN_SECS, BASE_COOLDOWN_SECS - strictness)`
pub const BASE_COOLDOWN_SECS: u32 = 15;
pub const MIN_COOLDOWN_SECS: u32 = 3;

/// Encouragement every `max(MIN_ENCOURAGE_TICKS, BASE_ENCOURAGE_TICKS - strictness * ENCOURAGE_STEP_TICKS)` focused ticks
pub const BASE_ENCOURAGE_TICKS: u32 = 180;
pub const MIN_ENCOURAGE_TICKS: u32 = 60;
pub const ENCOURAGE_STEP_TICKS: u32 = 10;
/// Encouragement never lands within this many seconds of another intervention
pub const ENCOURAGE_GAP_SECS: f64 = 30.0;

/// Severity cut-offs
pub const CRITICAL_AWAY_SECS: f64 = 30.0;
pub const HIGH_EYES_CLOSED_SECS: f64 = 3.0;
pub const MEDIUM_AWAY_SECS: f64 = 10.0;
/// Distraction escalates from low to medium at this strictness
pub const DISTRACTION_ESCALATES_AT: u8 = 5;

/// How hard the coach pushes, 1 (lenient) to 10 (strict)
///
/// Drives both the intervention cooldown and how often focus is praised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Strictness(u8);

impl Strictness {
    /// Clamp any integer into the accepted range
    #[must_use]
    pub fn new(value: i64) -> Self {
        let clamped = value.clamp(i64::from(MIN_STRICTNESS), i64::from(MAX_STRICTNESS));
        if clamped != value {
            log::warn!("Strictness {value} outside [{MIN_STRICTNESS}, {MAX_STRICTNESS}], clamped to {clamped}");
        }
        // clamped into 1..=10 above
        Self(u8::try_from(clamped).unwrap_or(DEFAULT_STRICTNESS))
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Minimum seconds between two fired interventions
    #[must_use]
    pub fn cooldown_secs(self) -> u32 {
        BASE_COOLDOWN_SECS
            .saturating_sub(u32::from(self.0))
            .max(MIN_COOLDOWN_SECS)
    }

    /// Focused ticks between two encouragements
    #[must_use]
    pub fn encourage_interval(self) -> u32 {
        BASE_ENCOURAGE_TICKS
            .saturating_sub(u32::from(self.0) * ENCOURAGE_STEP_TICKS)
            .max(MIN_ENCOURAGE_TICKS)
    }
}

impl Default for Strictness {
    fn default() -> Self {
        Self(DEFAULT_STRICTNESS)
    }
}

impl From<i64> for Strictness {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Strictness> for u8 {
    fn from(value: Strictness) -> Self {
        value.0
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Urgency attached to a decision, independent of any message text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    None,
    Positive,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Positive => "positive",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Whether an audio sink should speak this decision
    #[must_use]
    pub const fn is_audible(&self) -> bool {
        matches!(self, Self::Medium | Self::High | Self::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of message a renderer should pick for a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionCategory {
    /// Nothing to say this tick
    None,
    /// User came back after being away
    WelcomeBack,
    /// Praise for a sustained focus streak
    Encouragement,
    Unfocused,
    Distracted,
    Drowsy,
    Away,
    Absent,
}

impl InterventionCategory {
    /// Category that scolds a given status; focused has none
    #[must_use]
    pub const fn for_status(status: DisciplineStatus) -> Self {
        match status {
            DisciplineStatus::Focused => Self::None,
            DisciplineStatus::Unfocused => Self::Unfocused,
            DisciplineStatus::Distracted => Self::Distracted,
            DisciplineStatus::Drowsy => Self::Drowsy,
            DisciplineStatus::Away => Self::Away,
            DisciplineStatus::Absent => Self::Absent,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::WelcomeBack => "welcome_back",
            Self::Encouragement => "encouragement",
            Self::Unfocused => "unfocused",
            Self::Distracted => "distracted",
            Self::Drowsy => "drowsy",
            Self::Away => "away",
            Self::Absent => "absent",
        }
    }
}

impl fmt::Display for InterventionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The policy's output for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub should_intervene: bool,
    pub category: InterventionCategory,
    pub severity: Severity,
    pub status: DisciplineStatus,
    pub focus_streak: u32,
    /// Time spent producing this decision
    pub latency: Duration,
    pub timestamp: DateTime<Utc>,
}

impl Decision {
    fn fire(
        category: InterventionCategory,
        severity: Severity,
        state: &AgentState,
        status: DisciplineStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            should_intervene: true,
            category,
            severity,
            status,
            focus_streak: state.focus_streak,
            latency: Duration::ZERO,
            timestamp: now,
        }
    }

    pub(crate) fn skip(state: &AgentState, status: DisciplineStatus, now: DateTime<Utc>) -> Self {
        Self {
            should_intervene: false,
            category: InterventionCategory::None,
            severity: Severity::None,
            status,
            focus_streak: state.focus_streak,
            latency: Duration::ZERO,
            timestamp: now,
        }
    }
}

/// Mutable per-session memory of the policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    strictness: Strictness,
    pub focus_streak: u32,
    pub last_status: DisciplineStatus,
    pub last_intervention_at: DateTime<Utc>,
    pub total_away_ticks: u64,
    pub total_distracted_ticks: u64,
}

impl AgentState {
    /// Fresh state for a session starting at `started_at`
    ///
    /// The cooldown clock starts at session start, so nothing fires in the
    /// first few seconds.
    #[must_use]
    pub fn new(strictness: Strictness, started_at: DateTime<Utc>) -> Self {
        Self {
            strictness,
            focus_streak: 0,
            last_status: DisciplineStatus::Focused,
            last_intervention_at: started_at,
            total_away_ticks: 0,
            total_distracted_ticks: 0,
        }
    }

    /// Fixed for the lifetime of the session
    #[must_use]
    pub const fn strictness(&self) -> Strictness {
        self.strictness
    }

    fn record_tick(&mut self, status: DisciplineStatus) {
        if status.is_away() {
            self.total_away_ticks += 1;
            self.focus_streak = 0;
        } else if status.is_inattentive() {
            self.total_distracted_ticks += 1;
            self.focus_streak = 0;
        } else if status == DisciplineStatus::Focused {
            self.focus_streak += 1;
        }
    }
}

/// Cooldown- and streak-aware intervention decision engine
///
/// Stateless itself; all memory lives in the [`AgentState`] passed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterventionPolicy;

impl InterventionPolicy {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decide what to do about this tick and update `state`
    ///
    /// Total over its inputs. `now` is expected to be non-decreasing; if it
    /// is not, cooldowns are computed best-effort.
    pub fn decide(
        &self,
        status: DisciplineStatus,
        signal: &PerceptionSignal,
        state: &mut AgentState,
        now: DateTime<Utc>,
    ) -> Decision {
        state.record_tick(status);

        let since_last = elapsed_secs(state.last_intervention_at, now);
        let previous = state.last_status;
        state.last_status = status;

        // returning to the desk overrides cooldown
        if previous.is_away() && status == DisciplineStatus::Focused {
            state.last_intervention_at = now;
            return Decision::fire(
                InterventionCategory::WelcomeBack,
                Severity::Medium,
                state,
                status,
                now,
            );
        }

        if status == DisciplineStatus::Focused {
            return Self::focused(state, now, since_last);
        }

        if since_last < f64::from(state.strictness.cooldown_secs()) {
            return Decision::skip(state, status, now);
        }

        let severity = Self::severity(status, signal, state.strictness);
        state.last_intervention_at = now;
        Decision::fire(
            InterventionCategory::for_status(status),
            severity,
            state,
            status,
            now,
        )
    }

    fn focused(state: &mut AgentState, now: DateTime<Utc>, since_last: f64) -> Decision {
        let interval = state.strictness.encourage_interval();
        let streak = state.focus_streak;
        if streak > 0 && streak % interval == 0 && since_last > ENCOURAGE_GAP_SECS {
            state.last_intervention_at = now;
            return Decision::fire(
                InterventionCategory::Encouragement,
                Severity::Positive,
                state,
                DisciplineStatus::Focused,
                now,
            );
        }
        Decision::skip(state, DisciplineStatus::Focused, now)
    }

    /// First match wins
    #[must_use]
    pub fn severity(
        status: DisciplineStatus,
        signal: &PerceptionSignal,
        strictness: Strictness,
    ) -> Severity {
        if status == DisciplineStatus::Absent || signal.away_duration_sec > CRITICAL_AWAY_SECS {
            Severity::Critical
        } else if status == DisciplineStatus::Drowsy
            || signal.eyes_closed_duration_sec > HIGH_EYES_CLOSED_SECS
        {
            Severity::High
        } else if status == DisciplineStatus::Away || signal.away_duration_sec > MEDIUM_AWAY_SECS {
            Severity::Medium
        } else if status == DisciplineStatus::Distracted {
            if strictness.get() < DISTRACTION_ESCALATES_AT {
                Severity::Low
            } else {
                Severity::Medium
            }
        } else {
            Severity::Low
        }
    }
}
