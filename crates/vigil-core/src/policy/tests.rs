use super::*;
use chrono::TimeZone;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap() + chrono::Duration::seconds(secs)
}

fn signal(away: f64, eyes_closed: f64) -> PerceptionSignal {
    PerceptionSignal {
        face_present: away <= 0.0,
        eyes_detected: eyes_closed <= 0.0,
        looking_at_screen: true,
        away_duration_sec: away,
        eyes_closed_duration_sec: eyes_closed,
        raw_attention: 1.0,
    }
}

fn state(strictness: i64) -> AgentState {
    AgentState::new(Strictness::new(strictness), at(0))
}

// ============================================================================
// Strictness tests
// ============================================================================

#[test]
fn test_strictness_is_clamped() {
    assert_eq!(Strictness::new(0).get(), 1);
    assert_eq!(Strictness::new(-7).get(), 1);
    assert_eq!(Strictness::new(42).get(), 10);
    assert_eq!(Strictness::new(7).get(), 7);
}

#[test]
fn test_cooldown_tightens_with_strictness() {
    assert_eq!(Strictness::new(1).cooldown_secs(), 14);
    assert_eq!(Strictness::new(5).cooldown_secs(), 10);
    assert_eq!(Strictness::new(8).cooldown_secs(), 7);
    assert_eq!(Strictness::new(10).cooldown_secs(), 5);
}

#[test]
fn test_encourage_interval_shrinks_with_strictness() {
    assert_eq!(Strictness::new(1).encourage_interval(), 170);
    assert_eq!(Strictness::new(5).encourage_interval(), 130);
    assert_eq!(Strictness::new(10).encourage_interval(), 80);
}

#[test]
fn test_strictness_deserializes_clamped() {
    let strictness: Strictness = serde_json::from_str("15").unwrap();
    assert_eq!(strictness.get(), 10);
    assert_eq!(serde_json::to_string(&strictness).unwrap(), "10");
}

// ============================================================================
// Bookkeeping
// ============================================================================

#[test]
fn test_streak_and_counters() {
    let policy = InterventionPolicy::new();
    let mut state = state(5);

    policy.decide(DisciplineStatus::Focused, &signal(0.0, 0.0), &mut state, at(1));
    policy.decide(DisciplineStatus::Focused, &signal(0.0, 0.0), &mut state, at(2));
    assert_eq!(state.focus_streak, 2);

    // drowsy neither extends nor breaks the streak
    policy.decide(DisciplineStatus::Drowsy, &signal(0.0, 6.0), &mut state, at(3));
    assert_eq!(state.focus_streak, 2);

    policy.decide(DisciplineStatus::Unfocused, &signal(0.0, 0.0), &mut state, at(4));
    assert_eq!(state.focus_streak, 0);
    assert_eq!(state.total_distracted_ticks, 1);

    policy.decide(DisciplineStatus::Away, &signal(12.0, 0.0), &mut state, at(5));
    policy.decide(DisciplineStatus::Absent, &signal(31.0, 0.0), &mut state, at(6));
    assert_eq!(state.total_away_ticks, 2);
    assert_eq!(state.last_status, DisciplineStatus::Absent);
}

// ============================================================================
// Cooldown
// ============================================================================

#[test]
fn test_nothing_fires_inside_initial_cooldown() {
    let policy = InterventionPolicy::new();
    let mut state = state(5);
    let decision = policy.decide(DisciplineStatus::Distracted, &signal(0.0, 0.0), &mut state, at(4));
    assert!(!decision.should_intervene);
    assert_eq!(decision.category, InterventionCategory::None);
    assert_eq!(decision.severity, Severity::None);
    assert_eq!(decision.status, DisciplineStatus::Distracted);
}

#[test]
fn test_cooldown_suppresses_second_intervention() {
    let policy = InterventionPolicy::new();
    let mut state = state(5);

    let first = policy.decide(DisciplineStatus::Distracted, &signal(0.0, 0.0), &mut state, at(10));
    assert!(first.should_intervene);
    assert_eq!(first.category, InterventionCategory::Distracted);

    let second = policy.decide(DisciplineStatus::Distracted, &signal(0.0, 0.0), &mut state, at(15));
    assert!(!second.should_intervene);

    let third = policy.decide(DisciplineStatus::Distracted, &signal(0.0, 0.0), &mut state, at(20));
    assert!(third.should_intervene);
}

#[test]
fn test_backwards_clock_is_suppressed_not_fatal() {
    let policy = InterventionPolicy::new();
    let mut state = state(5);
    policy.decide(DisciplineStatus::Distracted, &signal(0.0, 0.0), &mut state, at(30));
    let decision = policy.decide(DisciplineStatus::Distracted, &signal(0.0, 0.0), &mut state, at(2));
    assert!(!decision.should_intervene);
}

// ============================================================================
// Re-entry
// ============================================================================

#[test]
fn test_welcome_back_ignores_cooldown() {
    let policy = InterventionPolicy::new();
    let mut state = state(5);
    state.last_status = DisciplineStatus::Away;
    state.last_intervention_at = at(0);

    let decision = policy.decide(DisciplineStatus::Focused, &signal(0.0, 0.0), &mut state, at(1));
    assert!(decision.should_intervene);
    assert_eq!(decision.category, InterventionCategory::WelcomeBack);
    assert_eq!(decision.severity, Severity::Medium);
    assert_eq!(state.last_status, DisciplineStatus::Focused);
    assert_eq!(state.last_intervention_at, at(1));
}

#[test]
fn test_welcome_back_after_absent() {
    let policy = InterventionPolicy::new();
    let mut state = state(3);
    policy.decide(DisciplineStatus::Absent, &signal(40.0, 0.0), &mut state, at(40));
    let decision = policy.decide(DisciplineStatus::Focused, &signal(0.0, 0.0), &mut state, at(41));
    assert_eq!(decision.category, InterventionCategory::WelcomeBack);
    assert_eq!(decision.focus_streak, 1);
}

#[test]
fn test_no_welcome_back_from_distracted() {
    let policy = InterventionPolicy::new();
    let mut state = state(5);
    state.last_status = DisciplineStatus::Distracted;
    let decision = policy.decide(DisciplineStatus::Focused, &signal(0.0, 0.0), &mut state, at(50));
    assert!(!decision.should_intervene);
}

// ============================================================================
// Encouragement
// ============================================================================

#[test]
fn test_encouragement_on_interval_boundary() {
    let policy = InterventionPolicy::new();
    let mut state = state(5);

    let mut fired = Vec::new();
    for tick in 1..=130 {
        let decision = policy.decide(DisciplineStatus::Focused, &signal(0.0, 0.0), &mut state, at(tick));
        if decision.should_intervene {
            fired.push((tick, decision));
        }
    }

    assert_eq!(fired.len(), 1);
    let (tick, decision) = &fired[0];
    assert_eq!(*tick, 130);
    assert_eq!(decision.category, InterventionCategory::Encouragement);
    assert_eq!(decision.severity, Severity::Positive);
    assert_eq!(decision.focus_streak, 130);
}

#[test]
fn test_no_encouragement_at_sixty_with_default_strictness() {
    let policy = InterventionPolicy::new();
    let mut state = state(5);
    state.focus_streak = 59;
    let decision = policy.decide(DisciplineStatus::Focused, &signal(0.0, 0.0), &mut state, at(60));
    assert_eq!(state.focus_streak, 60);
    assert!(!decision.should_intervene);
}

#[test]
fn test_encouragement_needs_gap_since_last_intervention() {
    let policy = InterventionPolicy::new();
    let mut state = state(10);
    state.focus_streak = 79;
    state.last_intervention_at = at(100);

    let decision = policy.decide(DisciplineStatus::Focused, &signal(0.0, 0.0), &mut state, at(110));
    assert_eq!(state.focus_streak, 80);
    assert!(!decision.should_intervene);
}

// ============================================================================
// Severity
// ============================================================================

#[test]
fn test_absent_is_critical_at_high_strictness() {
    let policy = InterventionPolicy::new();
    let mut state = state(8);
    let decision = policy.decide(DisciplineStatus::Absent, &signal(35.0, 0.0), &mut state, at(40));
    assert!(decision.should_intervene);
    assert_eq!(decision.severity, Severity::Critical);
    assert_eq!(decision.category, InterventionCategory::Absent);
    assert_eq!(state.last_intervention_at, at(40));
}

#[test]
fn test_severity_cascade() {
    let lenient = Strictness::new(4);
    let strict = Strictness::new(5);

    assert_eq!(
        InterventionPolicy::severity(DisciplineStatus::Drowsy, &signal(0.0, 6.0), strict),
        Severity::High
    );
    assert_eq!(
        InterventionPolicy::severity(DisciplineStatus::Unfocused, &signal(0.0, 4.0), strict),
        Severity::High
    );
    assert_eq!(
        InterventionPolicy::severity(DisciplineStatus::Away, &signal(12.0, 0.0), strict),
        Severity::Medium
    );
    assert_eq!(
        InterventionPolicy::severity(DisciplineStatus::Distracted, &signal(0.0, 0.0), lenient),
        Severity::Low
    );
    assert_eq!(
        InterventionPolicy::severity(DisciplineStatus::Distracted, &signal(0.0, 0.0), strict),
        Severity::Medium
    );
    assert_eq!(
        InterventionPolicy::severity(DisciplineStatus::Unfocused, &signal(0.0, 0.0), strict),
        Severity::Low
    );
    // long absence escalates regardless of status
    assert_eq!(
        InterventionPolicy::severity(DisciplineStatus::Distracted, &signal(31.0, 0.0), lenient),
        Severity::Critical
    );
}

#[test]
fn test_audible_severities() {
    assert!(!Severity::Low.is_audible());
    assert!(!Severity::Positive.is_audible());
    assert!(Severity::Medium.is_audible());
    assert!(Severity::Critical.is_audible());
}

#[test]
fn test_decision_serializes_snake_case() {
    let policy = InterventionPolicy::new();
    let mut state = state(5);
    state.last_status = DisciplineStatus::Absent;
    let decision = policy.decide(DisciplineStatus::Focused, &signal(0.0, 0.0), &mut state, at(1));
    let json = serde_json::to_value(&decision).unwrap();
    assert_eq!(json["category"], "welcome_back");
    assert_eq!(json["severity"], "medium");
    assert_eq!(json["status"], "focused");
}
