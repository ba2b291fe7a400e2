#[cfg(test)]
mod tests;

mod registry;

pub use registry::{SessionError, SessionRegistry};

use crate::aggregator::{SessionAggregator, SessionStats};
use crate::classifier::{ClassificationThresholds, StatusClassifier};
use crate::duration::PresenceTimers;
use crate::policy::{AgentState, Decision, InterventionPolicy, Strictness};
use crate::signal::{Observation, PerceptionSignal};
use crate::smoother::{SignalSmoother, DEFAULT_SMOOTHING_WINDOW};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

/// Per-session knobs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub strictness: Strictness,
    pub smoothing_window: usize,
    pub thresholds: ClassificationThresholds,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            strictness: Strictness::default(),
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            thresholds: ClassificationThresholds::default(),
        }
    }
}

impl SessionSettings {
    #[must_use]
    pub fn with_strictness(strictness: Strictness) -> Self {
        Self {
            strictness,
            ..Self::default()
        }
    }
}

/// One monitored session: timers, smoother, classifier, policy and history
///
/// Ticks must be fed by a single caller at a time.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    timers: PresenceTimers,
    smoother: SignalSmoother,
    classifier: StatusClassifier,
    policy: InterventionPolicy,
    state: AgentState,
    aggregator: SessionAggregator,
    ended_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Start a session with default settings at the given strictness
    #[must_use]
    pub fn new(strictness: Strictness, started_at: DateTime<Utc>) -> Self {
        Self::with_settings(
            Uuid::new_v4(),
            SessionSettings::with_strictness(strictness),
            started_at,
        )
    }

    #[must_use]
    pub fn with_settings(id: Uuid, settings: SessionSettings, started_at: DateTime<Utc>) -> Self {
        log::info!(
            "Created session {id} (strictness {}, window {})",
            settings.strictness,
            settings.smoothing_window
        );
        Self {
            id,
            timers: PresenceTimers::new(),
            smoother: SignalSmoother::new(settings.smoothing_window),
            classifier: StatusClassifier::new(settings.thresholds),
            policy: InterventionPolicy::new(),
            state: AgentState::new(settings.strictness, started_at),
            aggregator: SessionAggregator::new(started_at),
            ended_at: None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn state(&self) -> &AgentState {
        &self.state
    }

    #[must_use]
    pub fn history(&self) -> &[Decision] {
        self.aggregator.history()
    }

    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.aggregator.started_at()
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Run one raw observation through timers, smoother, classifier and policy
    ///
    /// An ended session answers with a skip decision and records nothing.
    pub fn tick(&mut self, observation: &Observation, now: DateTime<Utc>) -> Decision {
        if let Some(skip) = self.reject_if_ended(now) {
            return skip;
        }
        let started = Instant::now();
        let (away, eyes_closed) =
            self.timers
                .observe(observation.face_present, observation.eyes_detected, now);
        let signal = PerceptionSignal::from_observation(observation, away, eyes_closed);
        self.run(&signal, now, started)
    }

    /// Run a signal whose durations were already computed upstream
    pub fn process(&mut self, signal: &PerceptionSignal, now: DateTime<Utc>) -> Decision {
        if let Some(skip) = self.reject_if_ended(now) {
            return skip;
        }
        self.run(signal, now, Instant::now())
    }

    fn reject_if_ended(&self, now: DateTime<Utc>) -> Option<Decision> {
        if self.is_active() {
            return None;
        }
        log::warn!("Session {} has ended, ignoring tick", self.id);
        Some(Decision::skip(&self.state, self.state.last_status, now))
    }

    fn run(&mut self, signal: &PerceptionSignal, now: DateTime<Utc>, started: Instant) -> Decision {
        // zeros from the absence would otherwise hold the returning user below focus
        if signal.face_present && self.state.last_status.is_away() {
            self.smoother.reset();
        }
        let smoothed = self.smoother.update(signal.raw_attention);
        let status = self.classifier.classify(
            smoothed,
            signal.away_duration_sec,
            signal.eyes_closed_duration_sec,
            signal.looking_at_screen,
            signal.face_present,
        );

        let mut decision = self.policy.decide(status, signal, &mut self.state, now);
        decision.latency = started.elapsed();

        if decision.should_intervene {
            log::debug!(
                "Session {}: {} -> {} ({}), smoothed {smoothed:.2}",
                self.id,
                status,
                decision.category,
                decision.severity
            );
        } else {
            log::trace!("Session {}: {status}, smoothed {smoothed:.2}", self.id);
        }

        self.aggregator.record(decision.clone());
        decision
    }

    /// Statistics measured up to the latest decision
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        match self.ended_at {
            Some(ended_at) => self.aggregator.stats_at(ended_at),
            None => self.aggregator.stats(),
        }
    }

    /// Statistics measured up to `now`
    #[must_use]
    pub fn stats_at(&self, now: DateTime<Utc>) -> SessionStats {
        self.aggregator.stats_at(now)
    }

    /// Stop accepting ticks and return the final statistics
    ///
    /// Later ticks are ignored. Ending twice keeps the first end time.
    pub fn end(&mut self, now: DateTime<Utc>) -> SessionStats {
        let ended_at = *self.ended_at.get_or_insert(now);
        let stats = self.aggregator.stats_at(ended_at);
        log::info!(
            "Ended session {} ({} decisions, {} interventions, {:.1}% focus)",
            self.id,
            stats.total_decisions,
            stats.total_interventions,
            stats.focus_percentage
        );
        stats
    }
}
