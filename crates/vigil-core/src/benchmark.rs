//! Scripted scenarios for checking the coach end to end
//!
//! Each scenario is a sequence of observation runs fed to a fresh session at
//! one tick per second, paired with what the coach is expected to do.

use crate::policy::{InterventionCategory, Strictness};
use crate::session::{Session, SessionSettings};
use crate::signal::Observation;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// How fast the pipeline answered, judged for real-time use
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatencyGrade {
    Excellent,
    Good,
    Acceptable,
    TooSlow,
}

impl LatencyGrade {
    #[must_use]
    pub fn from_latency(latency: Duration) -> Self {
        match latency.as_millis() {
            0..=499 => Self::Excellent,
            500..=999 => Self::Good,
            1000..=1999 => Self::Acceptable,
            _ => Self::TooSlow,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Acceptable => "acceptable",
            Self::TooSlow => "too slow",
        }
    }
}

impl fmt::Display for LatencyGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a scenario should provoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// No corrective intervention (encouragement is allowed)
    Quiet,
    /// At least one intervention of this category
    Fires(InterventionCategory),
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quiet => f.write_str("quiet"),
            Self::Fires(category) => write!(f, "fires {category}"),
        }
    }
}

/// A named script of observation runs
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    /// `(observation, number of one-second ticks)`
    pub segments: Vec<(Observation, u32)>,
    pub expectation: Expectation,
}

impl Scenario {
    #[must_use]
    pub fn ticks(&self) -> u32 {
        self.segments.iter().map(|(_, n)| n).sum()
    }
}

/// Built-in scenarios
#[must_use]
pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "focused_working",
            description: "Steady attention for a minute",
            segments: vec![(Observation::attentive(), 60)],
            expectation: Expectation::Quiet,
        },
        Scenario {
            name: "brief_blink",
            description: "Eyes lost for a single frame",
            segments: vec![
                (Observation::attentive(), 20),
                (Observation::eyes_closed(), 1),
                (Observation::attentive(), 20),
            ],
            expectation: Expectation::Quiet,
        },
        Scenario {
            name: "looking_away",
            description: "Face turned away from the screen",
            segments: vec![
                (Observation::attentive(), 5),
                (Observation::looking_away(), 20),
            ],
            expectation: Expectation::Fires(InterventionCategory::Distracted),
        },
        Scenario {
            name: "dozing_off",
            description: "Eyes closed for fifteen seconds",
            segments: vec![(Observation::eyes_closed(), 15)],
            expectation: Expectation::Fires(InterventionCategory::Drowsy),
        },
        Scenario {
            name: "walking_away",
            description: "Leaves the desk for close to a minute",
            segments: vec![(Observation::attentive(), 5), (Observation::empty(), 50)],
            expectation: Expectation::Fires(InterventionCategory::Absent),
        },
        Scenario {
            name: "returning",
            description: "Steps away briefly and comes back",
            segments: vec![
                (Observation::attentive(), 5),
                (Observation::empty(), 15),
                (Observation::attentive(), 5),
            ],
            expectation: Expectation::Fires(InterventionCategory::WelcomeBack),
        },
    ]
}

/// Outcome of one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub expectation: Expectation,
    pub passed: bool,
    pub ticks: usize,
    pub interventions: usize,
    pub fired: Vec<InterventionCategory>,
    pub avg_latency: Duration,
}

/// Outcome of a benchmark run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub strictness: Strictness,
    pub results: Vec<ScenarioResult>,
    pub passed: usize,
    pub accuracy: f64,
    pub avg_latency: Duration,
    pub latency_grade: LatencyGrade,
}

/// Replay one scenario in a fresh session
#[must_use]
pub fn run_scenario(
    scenario: &Scenario,
    strictness: Strictness,
    started_at: DateTime<Utc>,
) -> ScenarioResult {
    let mut session = Session::with_settings(
        Uuid::new_v4(),
        SessionSettings::with_strictness(strictness),
        started_at,
    );

    let mut secs = 0_i64;
    for (observation, ticks) in &scenario.segments {
        for _ in 0..*ticks {
            secs += 1;
            session.tick(observation, started_at + ChronoDuration::seconds(secs));
        }
    }

    let history = session.history();
    let fired: Vec<InterventionCategory> = history
        .iter()
        .filter(|d| d.should_intervene)
        .map(|d| d.category)
        .collect();

    let passed = match scenario.expectation {
        Expectation::Quiet => fired
            .iter()
            .all(|c| *c == InterventionCategory::Encouragement),
        Expectation::Fires(category) => fired.contains(&category),
    };

    ScenarioResult {
        name: scenario.name.to_string(),
        expectation: scenario.expectation,
        passed,
        ticks: history.len(),
        interventions: fired.len(),
        fired,
        avg_latency: mean_latency(history.iter().map(|d| d.latency)),
    }
}

/// Run every built-in scenario at the given strictness
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn run_benchmark(strictness: Strictness, started_at: DateTime<Utc>) -> BenchmarkReport {
    let results: Vec<ScenarioResult> = scenarios()
        .iter()
        .map(|scenario| {
            let result = run_scenario(scenario, strictness, started_at);
            log::debug!(
                "Scenario {}: {} ({} interventions)",
                result.name,
                if result.passed { "pass" } else { "fail" },
                result.interventions
            );
            result
        })
        .collect();

    let passed = results.iter().filter(|r| r.passed).count();
    let accuracy = if results.is_empty() {
        0.0
    } else {
        passed as f64 / results.len() as f64
    };
    let avg_latency = mean_latency(results.iter().map(|r| r.avg_latency));

    BenchmarkReport {
        strictness,
        passed,
        accuracy,
        latency_grade: LatencyGrade::from_latency(avg_latency),
        avg_latency,
        results,
    }
}

fn mean_latency(latencies: impl Iterator<Item = Duration>) -> Duration {
    let (total, count) = latencies.fold((Duration::ZERO, 0_u32), |(total, count), latency| {
        (total + latency, count + 1)
    });
    if count == 0 {
        Duration::ZERO
    } else {
        total / count
    }
}
