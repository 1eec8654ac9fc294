use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type ExerciseName = String;

/// Exercise bank offered on first run.
pub const DEFAULT_BANK: &[&str] = &[
    "Bench Press",
    "Incline Bench Press",
    "Shoulder Press",
    "Lateral Raise",
    "Lat Pulldown",
    "Seated Row",
    "Squat",
    "Deadlift",
    "Leg Press",
    "Leg Curl",
    "Calf Raise",
    "Biceps Curl",
    "Triceps Pushdown",
    "Face Pull",
    "Chest Press",
    "Pull Up",
    "Dip",
    "Barbell Row",
    "Leg Extension",
];

pub fn default_bank() -> Vec<ExerciseName> {
    DEFAULT_BANK.iter().map(|s| s.to_string()).collect()
}

/// One recorded set. The wire names match exported files (`ts` in epoch millis).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRecord {
    pub exercise: ExerciseName,
    pub weight: f64,
    pub reps: u32,
    pub rpe: Option<f64>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub rest_sec: u64,
    #[serde(rename = "ts", with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl SetRecord {
    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }
}

/// A completed workout. Never mutated once appended to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub title: String,
    pub sets: Vec<SetRecord>,
}

impl WorkoutSession {
    /// Duration rounded to whole minutes, as shown in history lists
    pub fn duration_minutes(&self) -> u64 {
        (self.duration_ms + 30_000) / 60_000
    }

    pub fn month(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            first_name: "First".to_string(),
            last_name: "Last".to_string(),
        }
    }
}

impl Profile {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn initials(&self) -> String {
        let first = self.first_name.trim().chars().next().unwrap_or('?');
        let last = self.last_name.trim().chars().next().unwrap_or('?');
        format!("{first}{last}").to_uppercase()
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}
