//! Read-only queries over the completed workouts.
//!
//! Everything here is recomputed from the session list on each call; no
//! incremental state is kept.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use clap::ValueEnum;
use itertools::Itertools;

use crate::model::{SetRecord, WorkoutSession};
use crate::time_series::SeriesPoint;
use crate::util::{mean, round_to_tenth};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ProgressMode {
    #[default]
    Daily,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum AggMode {
    #[default]
    Avg,
    Max,
}

/// Sessions matching the text query and exercise filter, newest first.
///
/// The query is a case-insensitive substring of the title or of any set
/// note, taken as typed (whitespace included). Empty criteria match
/// everything.
pub fn filter<'a>(
    sessions: &'a [WorkoutSession],
    query: &str,
    exercise: &str,
) -> Vec<&'a WorkoutSession> {
    let query = query.to_lowercase();
    sessions
        .iter()
        .rev()
        .filter(|w| {
            let text_ok = query.is_empty()
                || w.title.to_lowercase().contains(&query)
                || w.sets.iter().any(|s| s.note.to_lowercase().contains(&query));
            let exercise_ok = exercise.is_empty() || w.sets.iter().any(|s| s.exercise == exercise);
            text_ok && exercise_ok
        })
        .collect()
}

/// Every exercise name that appears in a recorded set, sorted
pub fn exercise_universe(sessions: &[WorkoutSession]) -> Vec<String> {
    sessions
        .iter()
        .flat_map(|w| w.sets.iter().map(|s| s.exercise.clone()))
        .unique()
        .sorted()
        .collect()
}

fn volumes_for<'a>(session: &'a WorkoutSession, exercise: &'a str) -> impl Iterator<Item = f64> + 'a {
    session
        .sets
        .iter()
        .filter(move |s| s.exercise == exercise)
        .map(SetRecord::volume)
}

/// Total volume of `exercise` per calendar date, date ascending.
/// Dates with zero volume are left out.
pub fn daily_volume(sessions: &[WorkoutSession], exercise: &str) -> Vec<(NaiveDate, f64)> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for w in sessions {
        let volume: f64 = volumes_for(w, exercise).sum();
        if volume > 0.0 {
            *by_date.entry(w.date).or_insert(0.0) += volume;
        }
    }
    by_date.into_iter().collect()
}

/// Per-set volumes of `exercise` reduced per `YYYY-MM`, month ascending.
///
/// `Avg` is the mean rounded to the nearest integer.
pub fn monthly_aggregate(
    sessions: &[WorkoutSession],
    exercise: &str,
    mode: AggMode,
) -> Vec<(String, f64)> {
    let mut by_month: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for w in sessions {
        let volumes: Vec<f64> = volumes_for(w, exercise).collect();
        if !volumes.is_empty() {
            by_month.entry(w.month()).or_default().extend(volumes);
        }
    }
    by_month
        .into_iter()
        .map(|(month, volumes)| {
            let value = match mode {
                AggMode::Avg => mean(&volumes).unwrap_or(0.0).round(),
                AggMode::Max => volumes.iter().copied().fold(f64::MIN, f64::max),
            };
            (month, value)
        })
        .collect()
}

/// Labeled progress series for one exercise
pub fn progress_series(
    sessions: &[WorkoutSession],
    exercise: &str,
    mode: ProgressMode,
    agg: AggMode,
) -> Vec<SeriesPoint> {
    match mode {
        ProgressMode::Daily => daily_volume(sessions, exercise)
            .into_iter()
            .map(|(date, v)| SeriesPoint::new(date.format("%Y-%m-%d").to_string(), v))
            .collect(),
        ProgressMode::Monthly => monthly_aggregate(sessions, exercise, agg)
            .into_iter()
            .map(SeriesPoint::from)
            .collect(),
    }
}

/// Mean RPE over sets that have one, to one decimal
fn mean_rpe<'a>(sets: impl Iterator<Item = &'a SetRecord>) -> Option<f64> {
    let rpes: Vec<f64> = sets.filter_map(|s| s.rpe).collect();
    mean(&rpes).map(round_to_tenth)
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverallStats {
    pub workouts: usize,
    pub total_duration_ms: u64,
    pub avg_rpe: Option<f64>,
}

pub fn overall_stats(sessions: &[WorkoutSession]) -> OverallStats {
    OverallStats {
        workouts: sessions.len(),
        total_duration_ms: sessions.iter().map(|w| w.duration_ms).sum(),
        avg_rpe: mean_rpe(sessions.iter().flat_map(|w| w.sets.iter())),
    }
}

/// What the finish screen shows before a workout is confirmed
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub title: String,
    pub date: NaiveDate,
    pub elapsed: Duration,
    pub total_sets: usize,
    pub avg_rpe: Option<f64>,
    /// Per-set RPE in recording order, sets without RPE plot as 0
    pub rpe_series: Vec<SeriesPoint>,
}

pub fn session_summary(
    sets: &[SetRecord],
    title: &str,
    date: NaiveDate,
    elapsed: Duration,
) -> SessionSummary {
    let rpe_series = sets
        .iter()
        .map(|s| {
            let label = s
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%H:%M:%S")
                .to_string();
            SeriesPoint::new(label, s.rpe.unwrap_or(0.0))
        })
        .collect();
    SessionSummary {
        title: title.to_string(),
        date,
        elapsed,
        total_sets: sets.len(),
        avg_rpe: mean_rpe(sets.iter()),
        rpe_series,
    }
}
