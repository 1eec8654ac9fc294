use tracing::{error, info};

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::history::HistoryStore;
use crate::model::WorkoutSession;
use crate::session::SessionEngine;
use crate::store::{FileStore, PersistentStore, StoreError};
use crate::transfer::{self, Snapshot};

/// Outcome of confirming a finished workout
#[derive(Debug)]
pub struct FinishedWorkout {
    pub session: WorkoutSession,
    /// Set when the session is kept in memory but could not be written out
    pub save_error: Option<StoreError>,
}

/// Process-wide context: one history and one in-progress session
#[derive(Debug)]
pub struct App<S: PersistentStore = FileStore, C: Clock = SystemClock> {
    pub history: HistoryStore<S>,
    pub session: SessionEngine<C>,
}

impl<S: PersistentStore> App<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: PersistentStore, C: Clock> App<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            history: HistoryStore::load(store),
            session: SessionEngine::new(clock),
        }
    }

    /// Completes the current workout, hands it to history, then resets the
    /// session. A failed save is reported but does not lose the workout.
    pub fn finish_workout(&mut self) -> Result<FinishedWorkout> {
        let session = self.session.complete()?;
        let save_error = self.history.append(session.clone()).err();
        if let Some(e) = &save_error {
            error!(id = %session.id, error = %e, "workout kept in memory but not saved");
        }
        self.session.reset();
        Ok(FinishedWorkout {
            session,
            save_error,
        })
    }

    /// Adds a new name to the bank and selects it for the current workout
    pub fn add_exercise(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("exercise", "name is empty"));
        }
        self.history.add_exercise_to_bank(name)?;
        self.session.select_exercise(name)?;
        Ok(())
    }

    pub fn export_json(&self) -> Result<String> {
        transfer::export(
            self.history.sessions(),
            self.history.exercise_bank(),
            self.history.profile(),
            self.session.clock().now(),
        )
    }

    /// Replaces the whole history with the file's contents. Nothing changes
    /// when the file does not validate.
    pub fn import_json(&mut self, json: &str) -> Result<Snapshot> {
        let snapshot = transfer::import(
            json,
            self.history.exercise_bank(),
            self.history.profile(),
        )?;
        self.history.replace_all(
            snapshot.sessions.clone(),
            snapshot.exercise_bank.clone(),
            snapshot.profile.clone(),
        )?;
        info!(workouts = snapshot.sessions.len(), "import applied");
        Ok(snapshot)
    }
}
