use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::seq::IndexedRandom;

use speak_core::model::{Prompt, PromptCategory, PromptId, builtin_prompts};
use storage::json::read_json;
use storage::repository::{KeyValueStore, StorageKey};

use crate::error::CatalogError;
use crate::write_behind::WriteBehind;

/// Built-in prompts plus the user's own, with random draws and lookups.
///
/// The built-in deck is fixed at construction. Custom prompts are appended or
/// deleted by id and mirrored to storage after every change.
pub struct PromptCatalog {
    builtin: Vec<Prompt>,
    custom: Mutex<Vec<Prompt>>,
    store: Arc<dyn KeyValueStore>,
    writer: WriteBehind,
}

impl PromptCatalog {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_builtins(builtin_prompts(), store)
    }

    #[must_use]
    pub fn with_builtins(builtin: Vec<Prompt>, store: Arc<dyn KeyValueStore>) -> Self {
        let writer = WriteBehind::spawn(Arc::clone(&store));
        Self {
            builtin,
            custom: Mutex::new(Vec::new()),
            store,
            writer,
        }
    }

    /// Load saved custom prompts, replacing the in-memory list.
    ///
    /// A missing key leaves the list as it is. A read or decode failure is
    /// logged and also leaves the list untouched.
    pub async fn init(&self) {
        match read_json::<Vec<Prompt>>(self.store.as_ref(), StorageKey::CustomPrompts).await {
            Ok(Some(saved)) => {
                tracing::debug!(count = saved.len(), "loaded custom prompts");
                *self.custom() = saved;
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "failed to load custom prompts"),
        }
    }

    /// Draw a uniformly random prompt, optionally limited to `category`.
    ///
    /// A category with no prompts falls back to the whole pool.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyPool` only if there are no prompts at all.
    pub fn random_prompt(&self, category: Option<PromptCategory>) -> Result<Prompt, CatalogError> {
        let pool = self.all_prompts();
        let filtered: Vec<&Prompt> = match category {
            Some(category) => pool.iter().filter(|p| p.category() == category).collect(),
            None => Vec::new(),
        };

        let mut rng = rand::rng();
        let drawn = if filtered.is_empty() {
            pool.choose(&mut rng)
        } else {
            filtered.choose(&mut rng).copied()
        };
        drawn.cloned().ok_or(CatalogError::EmptyPool)
    }

    /// Every prompt in `category`, built-in first.
    #[must_use]
    pub fn prompts_by_category(&self, category: PromptCategory) -> Vec<Prompt> {
        self.all_prompts()
            .into_iter()
            .filter(|p| p.category() == category)
            .collect()
    }

    /// Built-in prompts followed by custom prompts in the order they were added.
    #[must_use]
    pub fn all_prompts(&self) -> Vec<Prompt> {
        let custom = self.custom();
        self.builtin.iter().chain(custom.iter()).cloned().collect()
    }

    /// Snapshot of the user's own prompts.
    #[must_use]
    pub fn custom_prompts(&self) -> Vec<Prompt> {
        self.custom().clone()
    }

    /// Create and persist a user prompt. `category` defaults to `Custom`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if the text is empty.
    pub fn add_custom_prompt(
        &self,
        text: impl Into<String>,
        category: Option<PromptCategory>,
    ) -> Result<Prompt, CatalogError> {
        let prompt = Prompt::new(
            PromptId::generate(),
            text,
            category.unwrap_or(PromptCategory::Custom),
        )?;

        let mut custom = self.custom();
        custom.push(prompt.clone());
        self.writer.set_json(StorageKey::CustomPrompts, custom.as_slice());
        Ok(prompt)
    }

    /// Case-insensitive substring search over prompt text. An empty query
    /// matches everything.
    #[must_use]
    pub fn search_prompts(&self, query: &str) -> Vec<Prompt> {
        let needle = query.to_lowercase();
        self.all_prompts()
            .into_iter()
            .filter(|p| p.matches_lowercase(&needle))
            .collect()
    }

    /// Remove a custom prompt by id.
    ///
    /// Returns `false` (and changes nothing) for unknown ids, built-in ids
    /// included.
    pub fn delete_custom_prompt(&self, id: &PromptId) -> bool {
        let mut custom = self.custom();
        let before = custom.len();
        custom.retain(|p| p.id() != id);
        let removed = custom.len() < before;
        if removed {
            self.writer.set_json(StorageKey::CustomPrompts, custom.as_slice());
        }
        removed
    }

    /// Wait for queued custom-prompt writes to reach storage.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    fn custom(&self) -> MutexGuard<'_, Vec<Prompt>> {
        self.custom.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use storage::repository::{InMemoryStore, StorageError};

    fn catalog() -> (PromptCatalog, InMemoryStore) {
        let store = InMemoryStore::new();
        (PromptCatalog::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn all_prompts_lists_builtin_then_custom() {
        let (catalog, _) = catalog();
        let first = catalog.add_custom_prompt("First pitch", None).unwrap();
        let second = catalog
            .add_custom_prompt("Second pitch", Some(PromptCategory::Leadership))
            .unwrap();

        let all = catalog.all_prompts();
        assert_eq!(all.len(), 27);
        assert_eq!(all[25], first);
        assert_eq!(all[26], second);
        assert_eq!(first.category(), PromptCategory::Custom);
    }

    #[tokio::test]
    async fn add_rejects_blank_text() {
        let (catalog, _) = catalog();
        let err = catalog.add_custom_prompt("  ", None).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert!(catalog.custom_prompts().is_empty());
    }

    #[tokio::test]
    async fn add_persists_custom_list() {
        let (catalog, store) = catalog();
        let prompt = catalog.add_custom_prompt("Pitch your project", None).unwrap();
        catalog.flush().await;

        let saved: Vec<Prompt> = read_json(&store, StorageKey::CustomPrompts)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved, vec![prompt]);
    }

    #[tokio::test]
    async fn random_draw_respects_category() {
        let (catalog, _) = catalog();
        for _ in 0..20 {
            let prompt = catalog.random_prompt(Some(PromptCategory::Creativity)).unwrap();
            assert_eq!(prompt.category(), PromptCategory::Creativity);
        }
    }

    #[tokio::test]
    async fn random_draw_falls_back_when_category_is_empty() {
        let (catalog, _) = catalog();
        let pool: HashSet<PromptId> = catalog.all_prompts().iter().map(|p| p.id().clone()).collect();
        for _ in 0..20 {
            let prompt = catalog.random_prompt(Some(PromptCategory::Custom)).unwrap();
            assert!(pool.contains(prompt.id()));
        }
    }

    #[tokio::test]
    async fn random_draw_on_empty_pool_errors() {
        let catalog = PromptCatalog::with_builtins(Vec::new(), Arc::new(InMemoryStore::new()));
        assert!(matches!(catalog.random_prompt(None), Err(CatalogError::EmptyPool)));
    }

    #[tokio::test]
    async fn prompts_by_category_includes_custom() {
        let (catalog, _) = catalog();
        let mine = catalog
            .add_custom_prompt("Lead a retro", Some(PromptCategory::Leadership))
            .unwrap();
        let leadership = catalog.prompts_by_category(PromptCategory::Leadership);
        assert_eq!(leadership.len(), 6);
        assert_eq!(leadership.last(), Some(&mine));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_empty_matches_all() {
        let (catalog, _) = catalog();
        let hits = catalog.search_prompts("LEADER");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text(), "Explain what makes a good leader");
        assert_eq!(catalog.search_prompts("").len(), 25);
        assert!(catalog.search_prompts("zebra").is_empty());
    }

    #[tokio::test]
    async fn delete_only_removes_custom_ids() {
        let (catalog, store) = catalog();
        let mine = catalog.add_custom_prompt("Pitch", None).unwrap();
        let builtin_id = catalog.all_prompts()[0].id().clone();

        assert!(!catalog.delete_custom_prompt(&builtin_id));
        assert!(!catalog.delete_custom_prompt(&PromptId::new("nope")));
        assert_eq!(catalog.all_prompts().len(), 26);

        assert!(catalog.delete_custom_prompt(mine.id()));
        assert!(!catalog.delete_custom_prompt(mine.id()));
        assert_eq!(catalog.all_prompts().len(), 25);

        catalog.flush().await;
        let saved: Vec<Prompt> = read_json(&store, StorageKey::CustomPrompts)
            .await
            .unwrap()
            .unwrap();
        assert!(saved.is_empty());
    }

    #[tokio::test]
    async fn init_restores_saved_prompts() {
        let store = InMemoryStore::new();
        let first = PromptCatalog::new(Arc::new(store.clone()));
        let saved = first.add_custom_prompt("Sell me this pen", None).unwrap();
        first.flush().await;

        let second = PromptCatalog::new(Arc::new(store));
        second.init().await;
        assert_eq!(second.custom_prompts(), vec![saved]);
    }

    #[tokio::test]
    async fn init_ignores_corrupt_data() {
        let store = InMemoryStore::new();
        store
            .set(StorageKey::CustomPrompts, "{broken".to_string())
            .await
            .unwrap();
        let catalog = PromptCatalog::new(Arc::new(store));
        catalog.init().await;
        assert!(catalog.custom_prompts().is_empty());
        assert_eq!(catalog.all_prompts().len(), 25);
    }

    struct FailingStore;

    #[async_trait::async_trait]
    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: StorageKey) -> Result<Option<String>, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn set(&self, _key: StorageKey, _value: String) -> Result<(), StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn remove(&self, _key: StorageKey) -> Result<(), StorageError> {
            Err(StorageError::Connection("offline".into()))
        }
    }

    #[tokio::test]
    async fn storage_failures_never_surface() {
        let catalog = PromptCatalog::new(Arc::new(FailingStore));
        catalog.init().await;
        let prompt = catalog.add_custom_prompt("Still works", None).unwrap();
        catalog.flush().await;
        assert_eq!(catalog.custom_prompts(), vec![prompt]);
    }
}
