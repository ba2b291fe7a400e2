//! Attention-state classification and intervention policy.
//!
//! Per-frame presence, gaze and eye signals go in; a stable attention
//! status and a decision about whether (and how hard) to nudge the user
//! come out. Everything here is synchronous and clock-free: callers supply
//! timestamps, so the same inputs always produce the same decisions.

pub mod aggregator;
pub mod benchmark;
pub mod classifier;
pub mod config;
pub mod duration;
pub mod policy;
pub mod session;
pub mod signal;
pub mod sink;
pub mod smoother;

pub use aggregator::{SessionAggregator, SessionStats};
pub use benchmark::{run_benchmark, BenchmarkReport, LatencyGrade};
pub use classifier::{ClassificationThresholds, DisciplineStatus, StatusClassifier};
pub use config::VigilConfig;
pub use duration::{DurationTracker, PresenceTimers};
pub use policy::{
    AgentState, Decision, InterventionCategory, InterventionPolicy, Severity, Strictness,
};
pub use session::{Session, SessionError, SessionRegistry, SessionSettings};
pub use signal::{AttentionEstimator, Observation, PerceptionSignal};
pub use sink::{dispatch, DecisionSink, DispatchReport};
pub use smoother::SignalSmoother;
