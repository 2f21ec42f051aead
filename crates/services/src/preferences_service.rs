use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use speak_core::model::{PreferencesPatch, UserPreferences};
use storage::json::read_json;
use storage::repository::{KeyValueStore, StorageKey};

use crate::error::PreferencesServiceError;
use crate::write_behind::WriteBehind;

/// Holds the user's preferences and mirrors changes to storage.
pub struct PreferencesService {
    current: Mutex<UserPreferences>,
    store: Arc<dyn KeyValueStore>,
    writer: WriteBehind,
}

impl PreferencesService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let writer = WriteBehind::spawn(Arc::clone(&store));
        Self {
            current: Mutex::new(UserPreferences::default()),
            store,
            writer,
        }
    }

    /// Load persisted preferences (or keep defaults if missing or unreadable).
    ///
    /// Stored fields are merged over the defaults; a stored value that fails
    /// validation is discarded as a whole.
    pub async fn init(&self) {
        let loaded =
            read_json::<UserPreferences>(self.store.as_ref(), StorageKey::UserPreferences).await;
        match loaded.map(|saved| saved.map(UserPreferences::validate)) {
            Ok(Some(Ok(saved))) => *self.current() = saved,
            Ok(Some(Err(err))) => {
                tracing::warn!(error = %err, "ignoring invalid stored preferences");
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "failed to load user preferences"),
        }
    }

    #[must_use]
    pub fn get(&self) -> UserPreferences {
        self.current().clone()
    }

    /// Validate and persist a partial update.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesServiceError::Validation` if the merged result is
    /// invalid; the current preferences are left unchanged.
    pub fn update(
        &self,
        patch: PreferencesPatch,
    ) -> Result<UserPreferences, PreferencesServiceError> {
        let mut current = self.current();
        let updated = current.apply(patch)?;
        *current = updated.clone();
        self.writer.set_json(StorageKey::UserPreferences, &updated);
        Ok(updated)
    }

    /// Restore and persist the defaults.
    pub fn reset(&self) -> UserPreferences {
        let defaults = UserPreferences::default();
        *self.current() = defaults.clone();
        self.writer.set_json(StorageKey::UserPreferences, &defaults);
        defaults
    }

    /// Wait for queued preference writes to reach storage.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    fn current(&self) -> MutexGuard<'_, UserPreferences> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speak_core::model::PromptCategory;
    use storage::repository::InMemoryStore;

    #[tokio::test]
    async fn starts_with_defaults() {
        let service = PreferencesService::new(Arc::new(InMemoryStore::new()));
        service.init().await;
        assert_eq!(service.get(), UserPreferences::default());
    }

    #[tokio::test]
    async fn update_persists_and_survives_restart() {
        let store = InMemoryStore::new();
        let service = PreferencesService::new(Arc::new(store.clone()));
        let patch = PreferencesPatch {
            timer_duration: Some(90),
            selected_prompt_categories: Some(vec![PromptCategory::Leadership]),
            ..PreferencesPatch::new()
        };
        let updated = service.update(patch).unwrap();
        service.flush().await;

        let reloaded = PreferencesService::new(Arc::new(store));
        reloaded.init().await;
        assert_eq!(reloaded.get(), updated);
        assert_eq!(reloaded.get().timer_duration(), 90);
    }

    #[tokio::test]
    async fn invalid_update_leaves_preferences_alone() {
        let service = PreferencesService::new(Arc::new(InMemoryStore::new()));
        let patch = PreferencesPatch {
            streak_goal: Some(0),
            ..PreferencesPatch::new()
        };
        assert!(service.update(patch).is_err());
        assert_eq!(service.get().streak_goal(), 3);
    }

    #[tokio::test]
    async fn reset_restores_defaults() {
        let store = InMemoryStore::new();
        let service = PreferencesService::new(Arc::new(store.clone()));
        service
            .update(PreferencesPatch {
                dark_mode: Some(true),
                ..PreferencesPatch::new()
            })
            .unwrap();
        let defaults = service.reset();
        service.flush().await;

        assert_eq!(defaults, UserPreferences::default());
        let saved: UserPreferences = read_json(&store, StorageKey::UserPreferences)
            .await
            .unwrap()
            .unwrap();
        assert!(!saved.dark_mode());
    }

    #[tokio::test]
    async fn invalid_stored_preferences_fall_back_to_defaults() {
        let store = InMemoryStore::new();
        store
            .set(StorageKey::UserPreferences, r#"{"streakGoal":0}"#.to_string())
            .await
            .unwrap();
        let service = PreferencesService::new(Arc::new(store));
        service.init().await;
        assert_eq!(service.get(), UserPreferences::default());
    }
}
