//! Error types for Tessera.
//!
//! Each concern has its own error enum next to its code. [`TesseraError`] is the
//! top-level error returned by [`crate::run`] and the CLI.

use thiserror::Error;

use crate::config::ConfigError;
use crate::keybind::KeybindParseError;
use crate::native::NativeError;
use crate::saved_state::SavedStateError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum TesseraError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform error: {0}")]
    Native(#[from] NativeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Saved state error: {0}")]
    SavedState(#[from] SavedStateError),

    #[error("Invalid keybinding: {0}")]
    Keybind(#[from] KeybindParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
}

pub type TesseraResult<T> = Result<T, TesseraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = TesseraError::from(ConfigError::Invalid("layoutEngines must list at least one engine".to_string()));
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid configuration: layoutEngines must list at least one engine"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let err: TesseraError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, TesseraError::Io(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_keybind_error_conversion() {
        let err: TesseraError = KeybindParseError::Empty.into();
        assert_eq!(err.to_string(), "Invalid keybinding: empty key chord");
    }
}
