#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod practice_ledger;
pub mod preferences_service;
pub mod prompt_catalog;
pub mod write_behind;

pub use speak_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, CatalogError, LedgerError, PreferencesServiceError};
pub use practice_ledger::PracticeLedger;
pub use preferences_service::PreferencesService;
pub use prompt_catalog::PromptCatalog;
pub use write_behind::WriteBehind;
