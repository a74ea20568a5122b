//! Command execution on top of the snapshot history.

pub mod command;
pub mod history;
pub mod session;
pub mod time;

pub use command::{Command, Outcome, RecurringEdit};
pub use history::{History, Listener, Snapshot};
pub use session::Session;
pub use time::{Clock, FixedClock, SystemClock};

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    Invalid(String),
}

impl ServiceError {
    pub fn is_user_facing(&self) -> bool {
        match self {
            ServiceError::Ledger(err) => err.is_user_facing(),
            ServiceError::Invalid(_) => true,
        }
    }
}
