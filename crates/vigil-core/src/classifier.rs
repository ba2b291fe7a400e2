use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete attention state for one tick
///
/// Exactly one status holds at a time. Away-family statuses outrank
/// eye-based ones, which outrank gaze, which outranks the smoothed score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisciplineStatus {
    /// Present, looking at the screen, smoothed attention healthy
    #[default]
    Focused,
    /// Present and looking, but smoothed attention has sagged
    Unfocused,
    /// Face visible but turned away from the screen
    Distracted,
    /// Eyes closed long enough to suggest dozing
    Drowsy,
    /// No face for a short stretch (stepped away)
    Away,
    /// No face for a long stretch (left the desk)
    Absent,
}

impl DisciplineStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Focused => "focused",
            Self::Unfocused => "unfocused",
            Self::Distracted => "distracted",
            Self::Drowsy => "drowsy",
            Self::Away => "away",
            Self::Absent => "absent",
        }
    }

    /// Not in front of the camera at all
    #[must_use]
    pub const fn is_away(&self) -> bool {
        matches!(self, Self::Away | Self::Absent)
    }

    /// In front of the camera but attention has wandered
    #[must_use]
    pub const fn is_inattentive(&self) -> bool {
        matches!(self, Self::Distracted | Self::Unfocused)
    }
}

impl fmt::Display for DisciplineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cut-offs for the status cascade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationThresholds {
    /// Away longer than this is `absent`
    pub absent_after_secs: f64,
    /// Away longer than this is `away`
    pub away_after_secs: f64,
    /// Eyes closed longer than this is `drowsy`
    pub drowsy_after_secs: f64,
    /// Smoothed attention below this is `unfocused`
    pub unfocused_below: f64,
}

pub const DEFAULT_ABSENT_AFTER_SECS: f64 = 30.0;
pub const DEFAULT_AWAY_AFTER_SECS: f64 = 10.0;
pub const DEFAULT_DROWSY_AFTER_SECS: f64 = 5.0;
pub const DEFAULT_UNFOCUSED_BELOW: f64 = 0.5;

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            absent_after_secs: DEFAULT_ABSENT_AFTER_SECS,
            away_after_secs: DEFAULT_AWAY_AFTER_SECS,
            drowsy_after_secs: DEFAULT_DROWSY_AFTER_SECS,
            unfocused_below: DEFAULT_UNFOCUSED_BELOW,
        }
    }
}

/// Which rule of the cascade produced the status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedRule {
    AbsentDuration,
    AwayDuration,
    EyesClosedDuration,
    GazeOffScreen,
    LowAttention,
    Fallthrough,
}

/// Classification result with the rule that decided it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub status: DisciplineStatus,
    pub rule: MatchedRule,
}

/// Maps smoothed score, duration timers and gaze to a status
///
/// Rules are evaluated in a fixed order and the first match wins:
/// absent > away > drowsy > distracted > unfocused > focused.
#[derive(Debug, Clone, Default)]
pub struct StatusClassifier {
    thresholds: ClassificationThresholds,
}

impl StatusClassifier {
    #[must_use]
    pub const fn new(thresholds: ClassificationThresholds) -> Self {
        Self { thresholds }
    }

    #[must_use]
    pub const fn thresholds(&self) -> &ClassificationThresholds {
        &self.thresholds
    }

    /// Classify one tick
    ///
    /// `face_present` is accepted for completeness; a missing face already
    /// shows up through the away timer and is not special-cased here.
    #[must_use]
    pub fn classify(
        &self,
        smoothed: f64,
        away_secs: f64,
        eyes_closed_secs: f64,
        looking_at_screen: bool,
        face_present: bool,
    ) -> DisciplineStatus {
        self.classify_full(
            smoothed,
            away_secs,
            eyes_closed_secs,
            looking_at_screen,
            face_present,
        )
        .status
    }

    /// Classify with the matched rule attached
    #[must_use]
    pub fn classify_full(
        &self,
        smoothed: f64,
        away_secs: f64,
        eyes_closed_secs: f64,
        looking_at_screen: bool,
        _face_present: bool,
    ) -> Classification {
        let t = &self.thresholds;
        let (status, rule) = if away_secs > t.absent_after_secs {
            (DisciplineStatus::Absent, MatchedRule::AbsentDuration)
        } else if away_secs > t.away_after_secs {
            (DisciplineStatus::Away, MatchedRule::AwayDuration)
        } else if eyes_closed_secs > t.drowsy_after_secs {
            (DisciplineStatus::Drowsy, MatchedRule::EyesClosedDuration)
        } else if !looking_at_screen {
            (DisciplineStatus::Distracted, MatchedRule::GazeOffScreen)
        } else if smoothed < t.unfocused_below {
            (DisciplineStatus::Unfocused, MatchedRule::LowAttention)
        } else {
            (DisciplineStatus::Focused, MatchedRule::Fallthrough)
        };

        log::trace!("Classified tick as {status} via {rule:?}");
        Classification { status, rule }
    }
}
