use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::practice_ledger::PracticeLedger;
use crate::preferences_service::PreferencesService;
use crate::prompt_catalog::PromptCatalog;

/// Environment variable naming the `SQLite` database URL.
pub const DB_URL_ENV: &str = "STAYONPOINT_DB_URL";

/// Database URL used when [`DB_URL_ENV`] is unset.
pub const DEFAULT_DB_URL: &str = "sqlite:stayonpoint.sqlite3";

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    prompts: Arc<PromptCatalog>,
    ledger: Arc<PracticeLedger>,
    preferences: Arc<PreferencesService>,
}

impl AppServices {
    /// Build services over `storage` and load their saved state.
    ///
    /// Load failures are logged by each service and never abort startup.
    pub async fn init(storage: Storage, clock: Clock) -> Self {
        let prompts = Arc::new(PromptCatalog::new(Arc::clone(&storage.kv)));
        let ledger = Arc::new(PracticeLedger::new(clock, Arc::clone(&storage.kv)));
        let preferences = Arc::new(PreferencesService::new(Arc::clone(&storage.kv)));

        tokio::join!(prompts.init(), ledger.init(), preferences.init());

        Self {
            prompts,
            ledger,
            preferences,
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::init(storage, clock).await)
    }

    /// Build `SQLite`-backed services at the location named by
    /// `STAYONPOINT_DB_URL`, falling back to [`DEFAULT_DB_URL`].
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn from_env(clock: Clock) -> Result<Self, AppServicesError> {
        let db_url = db_url_from(std::env::var(DB_URL_ENV).ok());
        tracing::debug!(%db_url, "opening practice database");
        Self::new_sqlite(&db_url, clock).await
    }

    #[must_use]
    pub fn prompts(&self) -> Arc<PromptCatalog> {
        Arc::clone(&self.prompts)
    }

    #[must_use]
    pub fn ledger(&self) -> Arc<PracticeLedger> {
        Arc::clone(&self.ledger)
    }

    #[must_use]
    pub fn preferences(&self) -> Arc<PreferencesService> {
        Arc::clone(&self.preferences)
    }

    /// Wait until every service has written its queued changes.
    pub async fn flush(&self) {
        tokio::join!(
            self.prompts.flush(),
            self.ledger.flush(),
            self.preferences.flush()
        );
    }
}

fn db_url_from(raw: Option<String>) -> String {
    raw.map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
        .unwrap_or_else(|| DEFAULT_DB_URL.to_string())
}
