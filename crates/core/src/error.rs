use thiserror::Error;

use crate::model::{PreferencesError, PromptError, SessionDraftError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error(transparent)]
    Session(#[from] SessionDraftError),
    #[error(transparent)]
    Preferences(#[from] PreferencesError),
}
