use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};

use onerep::error::Error;
use onerep::model::{Profile, SetRecord, WorkoutSession};
use onerep::transfer::{export, import};

fn set(exercise: &str, rpe: Option<f64>, note: &str, ms: i64) -> SetRecord {
    SetRecord {
        exercise: exercise.into(),
        weight: 62.5,
        reps: 6,
        rpe,
        note: note.into(),
        rest_sec: 120,
        timestamp: Utc.timestamp_millis_opt(ms).unwrap(),
    }
}

fn sessions() -> Vec<WorkoutSession> {
    vec![
        WorkoutSession {
            id: "0d9c6c38-3f0e-4d8f-9a38-6f4d1f3f2a11".into(),
            date: "2024-01-05".parse().unwrap(),
            duration_ms: 2_700_123,
            title: "Pull 💪".into(),
            sets: vec![
                set("Barbell Row", None, "", 1_704_450_000_123),
                set("Barbell Row", Some(7.5), "grip slipped – chalk", 1_704_450_240_456),
            ],
        },
        WorkoutSession {
            id: "second".into(),
            date: "2024-01-07".parse().unwrap(),
            duration_ms: 0,
            title: String::new(),
            sets: vec![set("Squat", Some(10.0), "日本語のメモ", 1_704_620_000_000)],
        },
    ]
}

#[test]
fn export_import_is_lossless() {
    let profile = Profile::new("Zoë", "Ørsted");
    let bank: Vec<String> = vec![];
    let json = export(&sessions(), &bank, &profile, Utc::now()).unwrap();

    let snapshot = import(&json, &["ignored".to_string()], &Profile::default()).unwrap();
    assert_eq!(snapshot.sessions, sessions());
    assert!(snapshot.exercise_bank.is_empty());
    assert_eq!(snapshot.profile, profile);
}

#[test]
fn legacy_sessions_key_is_accepted() {
    let json = export(&sessions(), &[], &Profile::default(), Utc::now())
        .unwrap()
        .replace("\"workouts\"", "\"sessions\"");
    let snapshot = import(&json, &[], &Profile::default()).unwrap();
    assert_eq!(snapshot.sessions.len(), 2);
}

#[test]
fn missing_bank_and_profile_keep_current_values() {
    let json = r#"{"version": 2, "workouts": []}"#;
    let current = Profile::new("Ada", "Lovelace");
    let snapshot = import(json, &["Squat".to_string()], &current).unwrap();
    assert!(snapshot.sessions.is_empty());
    assert_eq!(snapshot.exercise_bank, ["Squat"]);
    assert_eq!(snapshot.profile, current);
}

#[test]
fn malformed_files_are_rejected() {
    for json in [
        "",
        "[]",
        r#"{"version": 3}"#,
        r#"{"version": 9, "workouts": []}"#,
        r#"{"workouts": [{"id": "x"}]}"#,
        r#"{"workouts": {}}"#,
    ] {
        assert_matches!(
            import(json, &[], &Profile::default()),
            Err(Error::InvalidFormat(_)),
            "accepted {json:?}"
        );
    }
}
