//! Crate-level error type.

use thiserror::Error;

use crate::prefs::PrefsError;
use crate::provider::ProviderError;

/// Failures of a preference-driven analysis run.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Preferences(#[from] PrefsError),
}

pub type Result<T> = std::result::Result<T, Error>;
