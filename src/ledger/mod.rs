//! Ledger domain models, identity rules, and recurring-charge expansion.

pub mod amount;
pub mod budget;
pub mod category;
pub mod debt;
pub mod expense;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod recurring;
pub mod time_interval;

pub use amount::Amount;
pub use budget::Budget;
pub use category::Category;
pub use debt::{Debt, DebtKind};
pub use expense::{Expense, ExpenseFilter};
pub use ledger::{EntryList, Ledger, LedgerEntry, MaterializeReport};
pub use recurring::{Frequency, Materialization, RecurringExpander, RecurringTemplate};
pub use time_interval::{format_date, parse_date, DateWindow, TimeUnit, DATE_FORMAT};
