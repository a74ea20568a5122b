#![doc(test(attr(deny(warnings))))]

//! Expense Ledger keeps expenses, debts, budgets and recurring charges behind a
//! snapshot history with multi-level undo/redo, and derives category
//! statistics over date windows.

pub mod config;
pub mod engine;
pub mod errors;
pub mod ledger;
pub mod stats;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Expense Ledger tracing initialized.");
    });
}
