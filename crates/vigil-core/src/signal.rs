//! Per-tick perception input
//!
//! A perception backend (cascade detector, hosted model, test harness) hands
//! over an [`Observation`] each tick. The session turns it into a complete
//! [`PerceptionSignal`] by running the duration timers and, when the backend
//! did not supply one, estimating the raw attention score.

use serde::{Deserialize, Serialize};

/// What the perception backend saw in one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub face_present: bool,
    #[serde(default)]
    pub eyes_detected: bool,
    #[serde(default)]
    pub looking_at_screen: bool,
    /// Backend-provided attention; estimated from the flags when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_attention: Option<f64>,
}

impl Observation {
    /// Face centred, eyes visible
    #[must_use]
    pub const fn attentive() -> Self {
        Self {
            face_present: true,
            eyes_detected: true,
            looking_at_screen: true,
            raw_attention: None,
        }
    }

    /// Nobody in frame
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            face_present: false,
            eyes_detected: false,
            looking_at_screen: false,
            raw_attention: None,
        }
    }

    /// Face visible but turned away
    #[must_use]
    pub const fn looking_away() -> Self {
        Self {
            face_present: true,
            eyes_detected: true,
            looking_at_screen: false,
            raw_attention: None,
        }
    }

    /// Face visible and centred, no eyes found
    #[must_use]
    pub const fn eyes_closed() -> Self {
        Self {
            face_present: true,
            eyes_detected: false,
            looking_at_screen: true,
            raw_attention: None,
        }
    }

    #[must_use]
    pub const fn with_attention(mut self, raw_attention: f64) -> Self {
        self.raw_attention = Some(raw_attention);
        self
    }
}

/// Complete per-tick input to the decision core
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerceptionSignal {
    pub face_present: bool,
    pub eyes_detected: bool,
    pub looking_at_screen: bool,
    pub away_duration_sec: f64,
    pub eyes_closed_duration_sec: f64,
    /// Instantaneous attention in `[0, 1]`, not yet smoothed
    pub raw_attention: f64,
}

impl PerceptionSignal {
    /// Assemble a signal from an observation and the current timer readings
    ///
    /// Without a face, gaze is never on screen.
    #[must_use]
    pub fn from_observation(
        observation: &Observation,
        away_duration_sec: f64,
        eyes_closed_duration_sec: f64,
    ) -> Self {
        let looking_at_screen = observation.face_present && observation.looking_at_screen;
        let raw_attention = observation.raw_attention.unwrap_or_else(|| {
            AttentionEstimator::estimate(
                observation.face_present,
                looking_at_screen,
                observation.eyes_detected,
                eyes_closed_duration_sec,
            )
        });

        Self {
            face_present: observation.face_present,
            eyes_detected: observation.eyes_detected,
            looking_at_screen,
            away_duration_sec: away_duration_sec.max(0.0),
            eyes_closed_duration_sec: eyes_closed_duration_sec.max(0.0),
            raw_attention,
        }
    }
}

/// Fallback instantaneous attention when the backend gives only flags
pub struct AttentionEstimator;

impl AttentionEstimator {
    pub const NO_FACE: f64 = 0.0;
    pub const GAZE_OFF_SCREEN: f64 = 0.4;
    pub const EYES_SHUT: f64 = 0.3;
    pub const EYES_MISSING: f64 = 0.6;
    pub const ATTENTIVE: f64 = 1.0;
    /// Eyes missing longer than this reads as shut rather than a blink
    pub const EYES_SHUT_AFTER_SECS: f64 = 2.0;

    /// First match wins: no face, gaze off screen, eyes shut, eyes missing
    ///
    /// Eyes shut is checked before eyes missing, so eyes that stay missing
    /// past [`Self::EYES_SHUT_AFTER_SECS`] drop from 0.6 to 0.3. With the
    /// default window the smoothed score then falls under the unfocused
    /// cut-off, and a dozing user reads as `unfocused` for a couple of ticks
    /// before the drowsy timer takes over. With the two checks swapped,
    /// eyes missing would always score 0.6 and the 0.3 branch would never
    /// be reached.
    #[must_use]
    pub fn estimate(
        face_present: bool,
        looking_at_screen: bool,
        eyes_detected: bool,
        eyes_closed_secs: f64,
    ) -> f64 {
        if !face_present {
            Self::NO_FACE
        } else if !looking_at_screen {
            Self::GAZE_OFF_SCREEN
        } else if eyes_closed_secs > Self::EYES_SHUT_AFTER_SECS {
            Self::EYES_SHUT
        } else if !eyes_detected {
            Self::EYES_MISSING
        } else {
            Self::ATTENTIVE
        }
    }
}
