use chrono::{DateTime, Duration, NaiveDate, SubsecRound, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::aggregate::{session_summary, SessionSummary};
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::model::{ExerciseName, SetRecord, WorkoutSession};
use crate::rest_timer::RestTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionPhase {
    Idle,
    Selecting,
    Running,
    Paused,
    Completed,
}

/// The single in-progress workout.
///
/// All displayed times are derived from stored instants, so the caller may
/// poll `elapsed()` at any cadence.
#[derive(Debug)]
pub struct SessionEngine<C: Clock = SystemClock> {
    clock: C,
    phase: SessionPhase,
    selected: Vec<ExerciseName>,
    today_sets: Vec<SetRecord>,
    title: String,
    date: NaiveDate,
    started_at: Option<DateTime<Utc>>,
    pause_started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    paused_total: Duration,
    rest: RestTimer,
}

impl Default for SessionEngine<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> SessionEngine<C> {
    pub fn new(clock: C) -> Self {
        let date = clock.today();
        Self {
            clock,
            phase: SessionPhase::Idle,
            selected: Vec::new(),
            today_sets: Vec::new(),
            title: String::new(),
            date,
            started_at: None,
            pause_started_at: None,
            completed_at: None,
            paused_total: Duration::zero(),
            rest: RestTimer::default(),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.phase == SessionPhase::Paused
    }

    pub fn is_completed(&self) -> bool {
        self.phase == SessionPhase::Completed
    }

    pub fn selected(&self) -> &[ExerciseName] {
        &self.selected
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|s| s == name)
    }

    pub fn sets(&self) -> &[SetRecord] {
        &self.today_sets
    }

    /// Sets recorded for `exercise`, most recent first
    pub fn sets_for<'a>(&'a self, exercise: &'a str) -> impl Iterator<Item = &'a SetRecord> + 'a {
        self.today_sets
            .iter()
            .rev()
            .filter(move |s| s.exercise == exercise)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    fn ensure_not_completed(&self) -> Result<()> {
        if self.is_completed() {
            return Err(Error::SessionCompleted);
        }
        Ok(())
    }

    fn sync_selection_phase(&mut self) {
        if self.started_at.is_none() {
            self.phase = if self.selected.is_empty() {
                SessionPhase::Idle
            } else {
                SessionPhase::Selecting
            };
        }
    }

    /// Adds `name` to the selection. Returns false if it was already selected.
    pub fn select_exercise(&mut self, name: &str) -> Result<bool> {
        self.ensure_not_completed()?;
        if self.is_selected(name) {
            return Ok(false);
        }
        self.selected.push(name.to_string());
        self.sync_selection_phase();
        Ok(true)
    }

    /// Removes `name` from the selection; recorded sets are kept.
    pub fn deselect_exercise(&mut self, name: &str) -> Result<bool> {
        self.ensure_not_completed()?;
        let before = self.selected.len();
        self.selected.retain(|s| s != name);
        self.sync_selection_phase();
        Ok(self.selected.len() != before)
    }

    /// Flips membership. Returns whether `name` is selected afterwards.
    pub fn toggle_exercise(&mut self, name: &str) -> Result<bool> {
        if self.is_selected(name) {
            self.deselect_exercise(name)?;
            Ok(false)
        } else {
            self.select_exercise(name)
        }
    }

    pub fn can_start(&self) -> bool {
        !self.selected.is_empty()
            && self.started_at.is_none()
            && matches!(self.phase, SessionPhase::Idle | SessionPhase::Selecting)
    }

    /// Starts the workout clock. No-op unless exercises are selected and
    /// the clock has not started yet.
    pub fn start(&mut self) -> bool {
        if !self.can_start() {
            return false;
        }
        self.started_at = Some(self.clock.now());
        self.pause_started_at = None;
        self.paused_total = Duration::zero();
        self.phase = SessionPhase::Running;
        info!(exercises = self.selected.len(), "workout started");
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        self.pause_started_at = Some(self.clock.now());
        self.phase = SessionPhase::Paused;
        debug!("workout paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != SessionPhase::Paused {
            return false;
        }
        if let Some(paused_at) = self.pause_started_at.take() {
            self.paused_total = self.paused_total + (self.clock.now() - paused_at);
        }
        self.phase = SessionPhase::Running;
        debug!("workout resumed");
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            SessionPhase::Running => self.pause(),
            SessionPhase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Active workout time: zero before start, frozen while paused or completed
    pub fn elapsed(&self) -> Duration {
        let Some(started) = self.started_at else {
            return Duration::zero();
        };
        let reference = match self.phase {
            SessionPhase::Paused => self.pause_started_at.unwrap_or_else(|| self.clock.now()),
            SessionPhase::Completed => self.completed_at.unwrap_or_else(|| self.clock.now()),
            _ => self.clock.now(),
        };
        let elapsed = reference - started - self.paused_total;
        elapsed.max(Duration::zero())
    }

    pub fn start_rest(&mut self) -> bool {
        self.rest.start(self.clock.now())
    }

    pub fn stop_rest(&mut self) -> Option<u64> {
        let secs = self.rest.stop(self.clock.now());
        if let Some(secs) = secs {
            debug!(secs, "rest recorded");
        }
        secs
    }

    pub fn toggle_rest(&mut self) {
        if self.rest.is_running() {
            self.stop_rest();
        } else {
            self.start_rest();
        }
    }

    pub fn is_resting(&self) -> bool {
        self.rest.is_running()
    }

    pub fn rest_secs(&self) -> u64 {
        self.rest.running_secs(self.clock.now())
    }

    /// Last completed rest still waiting for the next set
    pub fn last_rest_secs(&self) -> u64 {
        self.rest.last_rest_secs()
    }

    /// Records a set against a selected exercise.
    ///
    /// Reps are truncated toward zero. Nothing changes when validation fails.
    pub fn add_set(
        &mut self,
        exercise: &str,
        weight: f64,
        reps: f64,
        rpe: Option<f64>,
        note: &str,
    ) -> Result<&SetRecord> {
        self.ensure_not_completed()?;
        if !self.is_selected(exercise) {
            return Err(Error::ExerciseNotSelected(exercise.to_string()));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::validation(
                "weight",
                "must be a finite non-negative number",
            ));
        }
        if !reps.is_finite() || reps < 0.0 {
            return Err(Error::validation(
                "reps",
                "must be a finite non-negative number",
            ));
        }
        let reps = reps.trunc();
        if reps > f64::from(u32::MAX) {
            return Err(Error::validation("reps", "too large"));
        }
        if let Some(rpe) = rpe {
            if !rpe.is_finite() || !(1.0..=10.0).contains(&rpe) {
                return Err(Error::validation("rpe", "must be between 1 and 10"));
            }
        }

        let record = SetRecord {
            exercise: exercise.to_string(),
            weight,
            reps: reps as u32,
            rpe,
            note: note.to_string(),
            rest_sec: self.rest.take_last_rest(),
            // exports carry epoch millis
            timestamp: self.clock.now().trunc_subsecs(3),
        };
        debug!(exercise, weight, reps = record.reps, "set added");
        self.today_sets.push(record);
        Ok(&self.today_sets[self.today_sets.len() - 1])
    }

    /// Summary of the working state, as shown before confirming a finish
    pub fn summary(&self) -> SessionSummary {
        session_summary(
            &self.today_sets,
            self.title.trim(),
            self.date,
            self.elapsed(),
        )
    }

    /// Freezes the clock and snapshots the workout. The caller must hand the
    /// snapshot to history before calling `reset`.
    pub fn complete(&mut self) -> Result<WorkoutSession> {
        self.ensure_not_completed()?;
        if self.today_sets.is_empty() {
            return Err(Error::EmptySession);
        }
        let duration_ms = self.elapsed().num_milliseconds().max(0) as u64;
        self.completed_at = Some(match self.phase {
            SessionPhase::Paused => self.pause_started_at.unwrap_or_else(|| self.clock.now()),
            _ => self.clock.now(),
        });
        self.phase = SessionPhase::Completed;

        let session = WorkoutSession {
            id: Uuid::new_v4().to_string(),
            date: self.date,
            duration_ms,
            title: self.title.trim().to_string(),
            sets: self.today_sets.clone(),
        };
        info!(id = %session.id, sets = session.sets.len(), duration_ms, "workout completed");
        Ok(session)
    }

    /// Back to an empty idle session dated today
    pub fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.selected.clear();
        self.today_sets.clear();
        self.title.clear();
        self.date = self.clock.today();
        self.started_at = None;
        self.pause_started_at = None;
        self.completed_at = None;
        self.paused_total = Duration::zero();
        self.rest = RestTimer::default();
    }
}
