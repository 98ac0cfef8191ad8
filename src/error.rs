//! Library error type

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("failed to convert form values: {0}")]
    Conversion(#[from] serde_json::Error),

    #[error("initial values must be an object, got `{0}`")]
    InvalidInitialValues(String),
}
