use std::result::Result as StdResult;

use thiserror::Error;

/// Error type that captures ledger, history, and persistence failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Duplicate entry: {0}")]
    DuplicateEntity(String),
    #[error("Entry not found: {0}")]
    EntityNotFound(String),
    #[error("Nothing to undo")]
    NoUndoableState,
    #[error("Nothing to redo")]
    NoRedoableState,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, LedgerError>;

impl LedgerError {
    /// Returns true for failures the user can recover from by issuing another command.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            LedgerError::DuplicateEntity(_)
                | LedgerError::EntityNotFound(_)
                | LedgerError::NoUndoableState
                | LedgerError::NoRedoableState
                | LedgerError::InvalidInput(_)
        )
    }
}
