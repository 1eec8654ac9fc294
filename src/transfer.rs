//! Export/import of the whole application state as a versioned JSON envelope.
//!
//! ```json
//! { "version": 3, "exportedAt": "...", "workouts": [...], "exerciseBank": [...], "profile": {...} }
//! ```
//!
//! Older files carry the workout list under `sessions` instead of `workouts`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::{Error, Result};
use crate::model::{ExerciseName, Profile, WorkoutSession};

pub const ENVELOPE_VERSION: u64 = 3;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportEnvelope<'a> {
    version: u64,
    exported_at: DateTime<Utc>,
    workouts: &'a [WorkoutSession],
    exercise_bank: &'a [ExerciseName],
    profile: &'a Profile,
}

/// Decoded import, ready for `HistoryStore::replace_all`
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub sessions: Vec<WorkoutSession>,
    pub exercise_bank: Vec<ExerciseName>,
    pub profile: Profile,
}

/// Where the workout list of an envelope lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkoutsKey {
    Workouts,
    LegacySessions,
}

impl WorkoutsKey {
    fn as_str(&self) -> &'static str {
        match self {
            WorkoutsKey::Workouts => "workouts",
            WorkoutsKey::LegacySessions => "sessions",
        }
    }
}

pub fn export(
    sessions: &[WorkoutSession],
    exercise_bank: &[ExerciseName],
    profile: &Profile,
    exported_at: DateTime<Utc>,
) -> Result<String> {
    let envelope = ExportEnvelope {
        version: ENVELOPE_VERSION,
        exported_at,
        workouts: sessions,
        exercise_bank,
        profile,
    };
    let json = serde_json::to_string_pretty(&envelope)
        .map_err(|e| Error::InvalidFormat(e.to_string()))?;
    info!(workouts = sessions.len(), "state exported");
    Ok(json)
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("onerep-export-{}.json", date.format("%Y-%m-%d"))
}

/// Locates the workout array: `workouts` wins over legacy `sessions`.
fn workouts_key(envelope: &Value) -> Option<WorkoutsKey> {
    [WorkoutsKey::Workouts, WorkoutsKey::LegacySessions]
        .into_iter()
        .find(|k| envelope.get(k.as_str()).is_some_and(Value::is_array))
}

fn decode_field<T: DeserializeOwned>(value: &Value, field: &str) -> Result<T> {
    T::deserialize(value).map_err(|e| Error::InvalidFormat(format!("{field}: {e}")))
}

/// Validates an envelope. `exerciseBank` and `profile` fall back to the
/// current values when absent.
pub fn import(
    json: &str,
    current_bank: &[ExerciseName],
    current_profile: &Profile,
) -> Result<Snapshot> {
    let envelope: Value =
        serde_json::from_str(json).map_err(|e| Error::InvalidFormat(e.to_string()))?;
    if !envelope.is_object() {
        return Err(Error::InvalidFormat("expected a JSON object".into()));
    }

    if let Some(version) = envelope.get("version").filter(|v| !v.is_null()) {
        let version = version
            .as_u64()
            .or_else(|| {
                version
                    .as_f64()
                    .filter(|v| *v >= 0.0 && v.fract() == 0.0)
                    .map(|v| v as u64)
            })
            .ok_or_else(|| {
                Error::InvalidFormat(format!("version must be a whole number, got {version}"))
            })?;
        if version > ENVELOPE_VERSION {
            return Err(Error::InvalidFormat(format!(
                "unsupported version {version}"
            )));
        }
    }

    let key = workouts_key(&envelope).ok_or_else(|| {
        Error::InvalidFormat("missing `workouts` or `sessions` array".into())
    })?;
    let sessions: Vec<WorkoutSession> = decode_field(&envelope[key.as_str()], key.as_str())?;

    let exercise_bank = match envelope.get("exerciseBank") {
        Some(bank) if bank.is_array() => decode_field(bank, "exerciseBank")?,
        _ => current_bank.to_vec(),
    };
    let profile = match envelope.get("profile") {
        Some(profile) if !profile.is_null() => decode_field(profile, "profile")?,
        _ => current_profile.clone(),
    };

    info!(
        workouts = sessions.len(),
        source = key.as_str(),
        "import decoded"
    );
    Ok(Snapshot {
        sessions,
        exercise_bank,
        profile,
    })
}
