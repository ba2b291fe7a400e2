//! Turning fired decisions into something a person notices

use anyhow::{Context, Result};
use std::io::Write;
use vigil_core::{Decision, DecisionSink, InterventionCategory, Severity};

const WELCOME_BACK: &[&str] = &[
    "Welcome back. Let's pick up where you left off.",
    "Good to see you again. Back to it.",
    "You're back. Ease in with the next small step.",
];

const ENCOURAGEMENT: &[&str] = &[
    "Nice streak. Keep it going.",
    "Solid focus so far.",
    "You're in the zone. Stay with it.",
];

const UNFOCUSED: &[&str] = &[
    "Attention is drifting. What's the next step?",
    "Bring it back to the task in front of you.",
];

const DISTRACTED: &[&str] = &[
    "Eyes back on the screen.",
    "Something pulled you away. Come back to the task.",
    "Distraction spotted. Refocus.",
];

const DROWSY: &[&str] = &[
    "Looks like you're nodding off. Stand up and stretch.",
    "Eyes are closing. Grab some water or take a short walk.",
];

const AWAY: &[&str] = &[
    "Still there? Your session is waiting.",
    "You stepped away. Come back when you're ready.",
];

const ABSENT: &[&str] = &[
    "You've been gone a while. Pause the session if you're on a break.",
    "Long absence detected. Time to get back to work.",
];

/// Canned lines for each intervention category
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageCatalog;

impl MessageCatalog {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Line for a category, rotated by `seed`
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn message(&self, category: InterventionCategory, seed: i64) -> Option<&'static str> {
        let lines = match category {
            InterventionCategory::None => return None,
            InterventionCategory::WelcomeBack => WELCOME_BACK,
            InterventionCategory::Encouragement => ENCOURAGEMENT,
            InterventionCategory::Unfocused => UNFOCUSED,
            InterventionCategory::Distracted => DISTRACTED,
            InterventionCategory::Drowsy => DROWSY,
            InterventionCategory::Away => AWAY,
            InterventionCategory::Absent => ABSENT,
        };
        let idx = seed.rem_euclid(lines.len() as i64) as usize;
        lines.get(idx).copied()
    }

    /// Line for a decision, rotated by its timestamp
    #[must_use]
    pub fn for_decision(&self, decision: &Decision) -> Option<&'static str> {
        self.message(decision.category, decision.timestamp.timestamp())
    }
}

/// Prints fired decisions as human-readable lines
pub struct ConsoleSink {
    catalog: MessageCatalog,
    bell: bool,
}

impl ConsoleSink {
    #[must_use]
    pub const fn new(bell: bool) -> Self {
        Self {
            catalog: MessageCatalog::new(),
            bell,
        }
    }

    fn line(&self, decision: &Decision) -> String {
        let message = self
            .catalog
            .for_decision(decision)
            .unwrap_or("Check in with yourself.");
        let bell = if self.bell && decision.severity.is_audible() {
            "\x07"
        } else {
            ""
        };
        format!(
            "{bell}[{}] {:<8} {:<13} {message}",
            decision.timestamp.format("%H:%M:%S"),
            severity_label(decision.severity),
            decision.category.as_str()
        )
    }
}

impl DecisionSink for ConsoleSink {
    fn deliver(&self, decision: &Decision) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", self.line(decision)).context("Failed to write to stdout")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

/// Writes fired decisions as JSON lines
pub struct JsonSink;

impl DecisionSink for JsonSink {
    fn deliver(&self, decision: &Decision) -> Result<()> {
        let line = serde_json::to_string(decision).context("Failed to serialize decision")?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{line}").context("Failed to write to stdout")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

const fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::None => "",
        Severity::Positive => "+",
        Severity::Low => "LOW",
        Severity::Medium => "MEDIUM",
        Severity::High => "HIGH",
        Severity::Critical => "CRITICAL",
    }
}
