pub mod json_backend;

use crate::{errors::Result, ledger::Ledger};

/// Abstraction over persistence backends that hold a single ledger document.
pub trait StorageBackend {
    fn load(&self) -> Result<Ledger>;
    fn save(&self, ledger: &Ledger) -> Result<()>;
}

pub use json_backend::{load_ledger_from_path, save_ledger_to_path, JsonStorage};
