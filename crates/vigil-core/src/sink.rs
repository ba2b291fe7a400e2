use crate::policy::Decision;
use anyhow::Result;

/// Somewhere a fired decision gets delivered (speaker, webhook, UI push)
///
/// Delivery is fire-and-forget: a decision is handed over once and never
/// retried.
pub trait DecisionSink: Send + Sync {
    /// Deliver one fired decision
    ///
    /// # Errors
    ///
    /// Returns an error if the sink could not accept the decision
    fn deliver(&self, decision: &Decision) -> Result<()>;

    /// Get the sink name
    #[must_use]
    fn name(&self) -> &'static str;
}

/// Result of handing one decision to every sink
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// Hand a decision to each sink once
///
/// Decisions that do not intervene are not delivered. Failures are logged
/// and collected; they never stop delivery to the remaining sinks.
pub fn dispatch(sinks: &[Box<dyn DecisionSink>], decision: &Decision) -> DispatchReport {
    let mut report = DispatchReport::default();
    if !decision.should_intervene {
        return report;
    }

    for sink in sinks {
        match sink.deliver(decision) {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                log::warn!("Sink {} failed to deliver {}: {e}", sink.name(), decision.category);
                report.failed += 1;
                report.errors.push(format!("{}: {e}", sink.name()));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::DisciplineStatus;
    use crate::policy::{InterventionCategory, Severity};
    use chrono::Utc;
    use std::sync::Mutex;

    struct Recorder {
        seen: Mutex<Vec<InterventionCategory>>,
    }

    impl DecisionSink for Recorder {
        fn deliver(&self, decision: &Decision) -> Result<()> {
            self.seen.lock().unwrap().push(decision.category);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Broken;

    impl DecisionSink for Broken {
        fn deliver(&self, _decision: &Decision) -> Result<()> {
            anyhow::bail!("webhook unreachable")
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    fn decision(should_intervene: bool) -> Decision {
        Decision {
            should_intervene,
            category: if should_intervene {
                InterventionCategory::Drowsy
            } else {
                InterventionCategory::None
            },
            severity: if should_intervene { Severity::High } else { Severity::None },
            status: DisciplineStatus::Drowsy,
            focus_streak: 0,
            latency: std::time::Duration::ZERO,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_skipped_decisions_are_not_delivered() {
        let sinks: Vec<Box<dyn DecisionSink>> = vec![Box::new(Broken)];
        let report = dispatch(&sinks, &decision(false));
        assert_eq!(report, DispatchReport::default());
    }

    #[test]
    fn test_failure_does_not_block_other_sinks() {
        let sinks: Vec<Box<dyn DecisionSink>> = vec![
            Box::new(Broken),
            Box::new(Recorder {
                seen: Mutex::new(Vec::new()),
            }),
        ];
        let report = dispatch(&sinks, &decision(true));
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors, vec!["broken: webhook unreachable".to_string()]);
    }
}
