use super::*;
use crate::classifier::DisciplineStatus;
use crate::policy::{InterventionCategory, Severity};
use chrono::{Duration, TimeZone};
use std::sync::Arc;
use std::thread;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 7, 8, 0, 0).unwrap() + Duration::seconds(secs)
}

fn run(session: &mut Session, from: i64, to: i64, observation: Observation) -> Vec<(i64, Decision)> {
    (from..=to)
        .map(|secs| (secs, session.tick(&observation, at(secs))))
        .collect()
}

fn fired(decisions: &[(i64, Decision)]) -> Vec<(i64, InterventionCategory, Severity)> {
    decisions
        .iter()
        .filter(|(_, d)| d.should_intervene)
        .map(|(secs, d)| (*secs, d.category, d.severity))
        .collect()
}

// ============================================================================
// Session pipeline
// ============================================================================

#[test]
fn test_attentive_user_gets_no_interventions() {
    let mut session = Session::new(Strictness::new(5), at(0));
    let decisions = run(&mut session, 1, 60, Observation::attentive());
    assert!(fired(&decisions).is_empty());
    assert!(decisions.iter().all(|(_, d)| d.status == DisciplineStatus::Focused));
    assert_eq!(session.state().focus_streak, 60);
}

#[test]
fn test_walking_away_escalates_then_welcomes_back() {
    let mut session = Session::new(Strictness::new(8), at(0));
    run(&mut session, 1, 5, Observation::attentive());

    // face lost at t=6: distracted until away > 10s, absent after 30s
    let away = run(&mut session, 6, 45, Observation::empty());
    assert_eq!(
        fired(&away),
        vec![
            (7, InterventionCategory::Distracted, Severity::Medium),
            (14, InterventionCategory::Distracted, Severity::Medium),
            (21, InterventionCategory::Away, Severity::Medium),
            (28, InterventionCategory::Away, Severity::Medium),
            (35, InterventionCategory::Away, Severity::Medium),
            (42, InterventionCategory::Absent, Severity::Critical),
        ]
    );
    assert_eq!(session.state().last_status, DisciplineStatus::Absent);

    // back at t=46, inside the cooldown from t=42
    let back = session.tick(&Observation::attentive(), at(46));
    assert_eq!(back.status, DisciplineStatus::Focused);
    assert!(back.should_intervene);
    assert_eq!(back.category, InterventionCategory::WelcomeBack);
    assert_eq!(back.severity, Severity::Medium);
}

#[test]
fn test_closed_eyes_become_drowsy() {
    let mut session = Session::new(Strictness::new(5), at(0));
    let decisions = run(&mut session, 1, 12, Observation::eyes_closed());

    let statuses: Vec<_> = decisions.iter().map(|(_, d)| d.status).collect();
    assert_eq!(statuses[0], DisciplineStatus::Focused);
    // timer starts at t=1, passes 5s at t=7
    assert_eq!(statuses[5], DisciplineStatus::Unfocused);
    assert_eq!(statuses[6], DisciplineStatus::Drowsy);

    assert_eq!(
        fired(&decisions),
        vec![(10, InterventionCategory::Drowsy, Severity::High)]
    );
}

#[test]
fn test_looking_away_respects_cooldown() {
    let mut session = Session::new(Strictness::new(3), at(0));
    let decisions = run(&mut session, 1, 30, Observation::looking_away());
    // cooldown 12s from session start
    let times: Vec<_> = fired(&decisions).iter().map(|(secs, _, _)| *secs).collect();
    assert_eq!(times, vec![12, 24]);
    assert!(fired(&decisions)
        .iter()
        .all(|(_, category, severity)| *category == InterventionCategory::Distracted
            && *severity == Severity::Low));
}

#[test]
fn test_process_uses_external_durations() {
    let mut session = Session::new(Strictness::new(8), at(0));
    let signal = PerceptionSignal {
        face_present: false,
        eyes_detected: false,
        looking_at_screen: false,
        away_duration_sec: 35.0,
        eyes_closed_duration_sec: 0.0,
        raw_attention: 0.0,
    };
    let decision = session.process(&signal, at(40));
    assert_eq!(decision.status, DisciplineStatus::Absent);
    assert_eq!(decision.category, InterventionCategory::Absent);
    assert_eq!(decision.severity, Severity::Critical);
}

#[test]
fn test_stats_on_fresh_session() {
    let session = Session::new(Strictness::default(), at(0));
    let stats = session.stats();
    assert_eq!(stats.total_decisions, 0);
    assert!(stats.intervention_rate.abs() < f64::EPSILON);
}

#[test]
fn test_end_freezes_stats_time() {
    let mut session = Session::new(Strictness::default(), at(0));
    run(&mut session, 1, 10, Observation::attentive());
    let stats = session.end(at(100));
    assert!(!session.is_active());
    assert!((stats.session_duration_secs - 100.0).abs() < 1e-9);
    assert_eq!(session.stats(), stats);

    // second end keeps the first timestamp
    let again = session.end(at(500));
    assert!((again.session_duration_secs - 100.0).abs() < 1e-9);
}

#[test]
fn test_ended_session_ignores_ticks() {
    let mut session = Session::new(Strictness::new(8), at(0));
    run(&mut session, 1, 5, Observation::attentive());
    let stats = session.end(at(6));

    let late = run(&mut session, 7, 60, Observation::empty());
    assert!(late.iter().all(|(_, d)| !d.should_intervene));
    assert!(late
        .iter()
        .all(|(_, d)| d.status == DisciplineStatus::Focused && d.focus_streak == 5));

    let signal = PerceptionSignal {
        face_present: false,
        eyes_detected: false,
        looking_at_screen: false,
        away_duration_sec: 35.0,
        eyes_closed_duration_sec: 0.0,
        raw_attention: 0.0,
    };
    assert!(!session.process(&signal, at(61)).should_intervene);

    assert_eq!(session.history().len(), 5);
    assert_eq!(session.stats(), stats);
}

#[test]
fn test_custom_settings_flow_through() {
    let settings = SessionSettings {
        strictness: Strictness::new(10),
        smoothing_window: 1,
        thresholds: ClassificationThresholds {
            unfocused_below: 0.7,
            ..ClassificationThresholds::default()
        },
    };
    let mut session = Session::with_settings(Uuid::new_v4(), settings, at(0));
    let decision = session.tick(&Observation::attentive().with_attention(0.65), at(1));
    assert_eq!(decision.status, DisciplineStatus::Unfocused);
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_lifecycle() {
    let registry = SessionRegistry::new();
    let id = registry
        .create(SessionSettings::default(), at(0))
        .unwrap();
    assert_eq!(registry.active_ids().unwrap(), vec![id]);

    registry.tick(id, &Observation::attentive(), at(1)).unwrap();
    registry.tick(id, &Observation::attentive(), at(2)).unwrap();
    assert_eq!(registry.stats(id).unwrap().total_decisions, 2);

    let stats = registry.end(id, at(3)).unwrap();
    assert_eq!(stats.total_decisions, 2);
    assert!(registry.active_ids().unwrap().is_empty());

    assert_eq!(
        registry.tick(id, &Observation::attentive(), at(4)),
        Err(SessionError::Ended(id))
    );
    assert_eq!(registry.end(id, at(5)), Err(SessionError::Ended(id)));
    assert_eq!(registry.stats(id).unwrap().total_decisions, 2);

    let archived = registry.remove(id).unwrap();
    assert_eq!(archived.history().len(), 2);
    assert_eq!(registry.count().unwrap(), 0);
}

#[test]
fn test_registry_unknown_session() {
    let registry = SessionRegistry::new();
    let id = Uuid::new_v4();
    assert_eq!(registry.stats(id), Err(SessionError::NotFound(id)));
    assert!(matches!(registry.remove(id), Err(SessionError::NotFound(_))));
    assert_eq!(
        SessionError::NotFound(id).to_string(),
        format!("session {id} not found")
    );
}

#[test]
fn test_sessions_tick_in_parallel() {
    let registry = Arc::new(SessionRegistry::new());
    let handles: Vec<_> = (1..=4)
        .map(|strictness| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let id = registry
                    .create(SessionSettings::with_strictness(Strictness::new(strictness)), at(0))
                    .unwrap();
                for secs in 1..=50 {
                    registry
                        .tick(id, &Observation::looking_away(), at(secs))
                        .unwrap();
                }
                id
            })
        })
        .collect();

    let ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(registry.count().unwrap(), 4);
    for id in ids {
        let stats = registry.stats(id).unwrap();
        assert_eq!(stats.total_decisions, 50);
        assert_eq!(stats.total_distracted_ticks, 50);
    }
}
