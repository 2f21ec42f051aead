//! Shared error types for the services crate.

use thiserror::Error;

use speak_core::model::{PreferencesError, PromptError, SessionDraftError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `PromptCatalog`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("no prompts available")]
    EmptyPool,
    #[error(transparent)]
    Validation(#[from] PromptError),
}

/// Errors emitted by `PracticeLedger`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] SessionDraftError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `PreferencesService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PreferencesServiceError {
    #[error(transparent)]
    Validation(#[from] PreferencesError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
