//! Error types for screens.

use tabula_core::{ConfigError, FilterError, StoreError, TabulaError};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ScreenError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ScreenError {
    /// Message for the person using the screen. Never carries internals.
    pub fn user_message(&self) -> String {
        TabulaError::from(self.clone()).user_message()
    }
}

impl From<ScreenError> for TabulaError {
    fn from(err: ScreenError) -> Self {
        match err {
            ScreenError::Store(e) => TabulaError::Store(e),
            ScreenError::Filter(e) => TabulaError::Filter(e),
            ScreenError::Config(e) => TabulaError::Config(e),
        }
    }
}

pub type ScreenResult<T> = Result<T, ScreenError>;
