use chrono::{DateTime, Utc};

/// Seconds elapsed from `since` to `now`, negative if the caller's clock went backwards
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn elapsed_secs(since: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - since).num_milliseconds() as f64 / 1000.0
}

/// Timer for "how long has this condition held without interruption"
///
/// A single tick where the condition is false resets the timer. There is no
/// forgiveness window.
#[derive(Debug, Clone, Default)]
pub struct DurationTracker {
    started_at: Option<DateTime<Utc>>,
}

impl DurationTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self { started_at: None }
    }

    /// Feed the condition for this tick and get how long it has held
    ///
    /// The first active tick records the start and returns 0. An inactive
    /// tick clears the start and returns 0. A clock that runs backwards
    /// yields 0 rather than a negative duration.
    pub fn observe(&mut self, condition_active: bool, now: DateTime<Utc>) -> f64 {
        if !condition_active {
            self.started_at = None;
            return 0.0;
        }

        let started_at = *self.started_at.get_or_insert(now);
        elapsed_secs(started_at, now).max(0.0)
    }

    /// Whether the condition is currently being timed
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }
}

/// The two independent timers a session keeps: face missing, and eyes closed
#[derive(Debug, Clone, Default)]
pub struct PresenceTimers {
    pub away: DurationTracker,
    pub eyes_closed: DurationTracker,
}

impl PresenceTimers {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            away: DurationTracker::new(),
            eyes_closed: DurationTracker::new(),
        }
    }

    /// Advance both timers and return `(away_secs, eyes_closed_secs)`
    ///
    /// Eyes are only timed while a face is visible; losing the face resets
    /// the eyes-closed timer and starts the away timer.
    pub fn observe(
        &mut self,
        face_present: bool,
        eyes_detected: bool,
        now: DateTime<Utc>,
    ) -> (f64, f64) {
        let away = self.away.observe(!face_present, now);
        let eyes_closed = self
            .eyes_closed
            .observe(face_present && !eyes_detected, now);
        (away, eyes_closed)
    }
}
