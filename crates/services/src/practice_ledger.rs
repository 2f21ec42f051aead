use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Duration, NaiveDate};

use speak_core::model::{PracticeSession, PracticeStats, SessionDraft, SessionId, StreakData};
use storage::json::read_json;
use storage::repository::{KeyValueStore, StorageKey};

use crate::Clock;
use crate::error::LedgerError;
use crate::write_behind::WriteBehind;

#[derive(Default)]
struct LedgerState {
    history: Vec<PracticeSession>,
    streak: StreakData,
}

/// Append-only log of practice attempts and the streak derived from it.
pub struct PracticeLedger {
    clock: Mutex<Clock>,
    state: Mutex<LedgerState>,
    store: Arc<dyn KeyValueStore>,
    writer: WriteBehind,
}

impl PracticeLedger {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn KeyValueStore>) -> Self {
        let writer = WriteBehind::spawn(Arc::clone(&store));
        Self {
            clock: Mutex::new(clock),
            state: Mutex::new(LedgerState::default()),
            store,
            writer,
        }
    }

    /// Load the saved log and streak aggregate.
    ///
    /// A missing key keeps its current value. If either key fails to read or
    /// decode, both are reset to empty so the streak never outlives its log.
    pub async fn init(&self) {
        let store = self.store.as_ref();
        let history = read_json::<Vec<PracticeSession>>(store, StorageKey::PracticeHistory).await;
        let streak = read_json::<StreakData>(store, StorageKey::StreakData).await;

        let mut state = self.state();
        match (history, streak) {
            (Ok(history), Ok(streak)) => {
                if let Some(saved) = history {
                    tracing::debug!(count = saved.len(), "loaded practice history");
                    state.history = saved;
                }
                if let Some(saved) = streak {
                    state.streak = saved;
                }
            }
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(error = %err, "failed to load practice history");
                *state = LedgerState::default();
            }
        }
    }

    /// Stamp and append an attempt, update the streak if it was completed,
    /// and queue both for storage.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the draft is out of range. Storage
    /// failures are logged by the writer, never returned.
    pub fn add_practice_session(
        &self,
        draft: SessionDraft,
    ) -> Result<PracticeSession, LedgerError> {
        let clock = self.clock();
        let session = draft.stamp(SessionId::generate(), clock.today(), clock.now())?;

        let mut state = self.state();
        state.history.push(session.clone());
        if session.completed() {
            state.streak.record_completion(session.date());
        }

        self.writer
            .set_json(StorageKey::PracticeHistory, state.history.as_slice());
        self.writer.set_json(StorageKey::StreakData, &state.streak);

        Ok(session)
    }

    /// Sessions dated within `[start, end]`, newest first.
    ///
    /// Either bound may be omitted. Sessions sharing a timestamp keep their
    /// log order.
    #[must_use]
    pub fn practice_history(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<PracticeSession> {
        let mut sessions: Vec<PracticeSession> = self
            .state()
            .history
            .iter()
            .filter(|s| s.falls_within(start, end))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        sessions
    }

    /// Sessions recorded today, in log order.
    #[must_use]
    pub fn todays_practice(&self) -> Vec<PracticeSession> {
        let today = self.clock().today();
        self.state()
            .history
            .iter()
            .filter(|s| s.date() == today)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn streak_data(&self) -> StreakData {
        self.state().streak.clone()
    }

    /// Stats over the last `days` calendar days, today included.
    #[must_use]
    pub fn recent_stats(&self, days: u32) -> PracticeStats {
        if days == 0 {
            return PracticeStats::default();
        }
        let today = self.clock().today();
        // A window reaching past the earliest representable date is unbounded.
        let start = today.checked_sub_signed(Duration::days(i64::from(days) - 1));
        let state = self.state();
        PracticeStats::from_sessions(
            state
                .history
                .iter()
                .filter(|s| s.falls_within(start, Some(today))),
        )
    }

    /// Forget every session and zero the streak, in memory only.
    ///
    /// Storage keeps its last copy; see [`PracticeLedger::purge`].
    pub fn clear_practice_history(&self) {
        let mut state = self.state();
        *state = LedgerState::default();
        tracing::info!("practice history cleared");
    }

    /// Clear in memory and delete the stored history and streak.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Storage` if a stored key cannot be deleted.
    pub async fn purge(&self) -> Result<(), LedgerError> {
        self.clear_practice_history();
        self.writer.flush().await;
        self.store.remove(StorageKey::PracticeHistory).await?;
        self.store.remove(StorageKey::StreakData).await?;
        tracing::info!("stored practice history purged");
        Ok(())
    }

    /// Wait for queued history and streak writes to reach storage.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    /// Move a fixed clock forward. No effect on the system clock.
    pub fn advance_clock(&self, delta: Duration) {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner).advance(delta);
    }

    fn clock(&self) -> Clock {
        *self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
