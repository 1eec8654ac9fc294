use serde::Serialize;
use tracing::{info, warn};

use crate::model::{default_bank, ExerciseName, Profile, WorkoutSession};
use crate::store::{FileStore, PersistentStore, StoreError, StoreKey};

/// Completed workouts (oldest first), the exercise bank and the profile.
///
/// Every mutation updates memory first and persists afterwards, so a failed
/// write leaves a valid but unsaved model behind.
#[derive(Debug)]
pub struct HistoryStore<S: PersistentStore = FileStore> {
    store: S,
    sessions: Vec<WorkoutSession>,
    exercise_bank: Vec<ExerciseName>,
    profile: Profile,
}

impl<S: PersistentStore> HistoryStore<S> {
    pub fn load(store: S) -> Self {
        let sessions = store.get(StoreKey::Workouts, Vec::new());
        let exercise_bank = store.get(StoreKey::ExerciseBank, default_bank());
        let profile = store.get(StoreKey::Profile, Profile::default());
        info!(
            sessions = sessions.len(),
            exercises = exercise_bank.len(),
            "history loaded"
        );
        Self {
            store,
            sessions,
            exercise_bank,
            profile,
        }
    }

    pub fn sessions(&self) -> &[WorkoutSession] {
        &self.sessions
    }

    pub fn exercise_bank(&self) -> &[ExerciseName] {
        &self.exercise_bank
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn append(&mut self, session: WorkoutSession) -> Result<(), StoreError> {
        self.sessions.push(session);
        persist(&mut self.store, StoreKey::Workouts, &self.sessions)
    }

    /// Adds a trimmed, non-empty name unless already present (exact match).
    /// Returns whether the bank changed.
    pub fn add_exercise_to_bank(&mut self, name: &str) -> Result<bool, StoreError> {
        let name = name.trim();
        if name.is_empty() || self.exercise_bank.iter().any(|e| e == name) {
            return Ok(false);
        }
        self.exercise_bank.push(name.to_string());
        persist(&mut self.store, StoreKey::ExerciseBank, &self.exercise_bank)?;
        Ok(true)
    }

    /// Blank names keep their previous value.
    pub fn set_profile(&mut self, first_name: &str, last_name: &str) -> Result<(), StoreError> {
        if !first_name.trim().is_empty() {
            self.profile.first_name = first_name.trim().to_string();
        }
        if !last_name.trim().is_empty() {
            self.profile.last_name = last_name.trim().to_string();
        }
        persist(&mut self.store, StoreKey::Profile, &self.profile)
    }

    /// Total overwrite used by import.
    ///
    /// Workouts are written first. Every key is attempted even after a
    /// failure; the first error is returned.
    pub fn replace_all(
        &mut self,
        sessions: Vec<WorkoutSession>,
        exercise_bank: Vec<ExerciseName>,
        profile: Profile,
    ) -> Result<(), StoreError> {
        self.sessions = sessions;
        self.exercise_bank = exercise_bank;
        self.profile = profile;
        let results = [
            (
                StoreKey::Workouts,
                persist(&mut self.store, StoreKey::Workouts, &self.sessions),
            ),
            (
                StoreKey::ExerciseBank,
                persist(&mut self.store, StoreKey::ExerciseBank, &self.exercise_bank),
            ),
            (
                StoreKey::Profile,
                persist(&mut self.store, StoreKey::Profile, &self.profile),
            ),
        ];
        let failed: Vec<&str> = results
            .iter()
            .filter(|(_, r)| r.is_err())
            .map(|(key, _)| key.as_str())
            .collect();
        if !failed.is_empty() {
            warn!(?failed, "import applied in memory only for some keys");
        }
        results
            .into_iter()
            .map(|(_, r)| r)
            .find(Result::is_err)
            .unwrap_or(Ok(()))
    }

    /// Up to `n` sessions, most recently completed first
    pub fn recent(&self, n: usize) -> Vec<&WorkoutSession> {
        self.sessions.iter().rev().take(n).collect()
    }
}

fn persist<S: PersistentStore, T: Serialize>(
    store: &mut S,
    key: StoreKey,
    value: &T,
) -> Result<(), StoreError> {
    store.set(key, value).map_err(|e| {
        warn!(key = key.as_str(), error = %e, "failed to persist");
        e
    })
}
