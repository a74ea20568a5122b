use chrono::NaiveDate;
use tracing::{info, warn};

use crate::ledger::{Ledger, LedgerEntry};
use crate::stats::StatisticsEngine;
use crate::storage::StorageBackend;

use super::{
    command::{Command, Outcome},
    history::{History, Snapshot},
    time::Clock,
    ServiceError, ServiceResult,
};

/// Runs commands against the snapshot history and persists the current ledger.
///
/// Every mutating command edits a working copy of the current ledger and only
/// commits it when the edit succeeded, so a failed command leaves the history
/// untouched.
pub struct Session {
    history: History,
    storage: Option<Box<dyn StorageBackend>>,
    clock: Box<dyn Clock>,
}

impl Session {
    /// In-memory session without persistence.
    pub fn new(ledger: Ledger, clock: impl Clock + 'static) -> Self {
        Self {
            history: History::new(ledger),
            storage: None,
            clock: Box::new(clock),
        }
    }

    /// Loads the ledger, materializes recurring expenses due today and seeds the history.
    pub fn open(
        storage: impl StorageBackend + 'static,
        clock: impl Clock + 'static,
    ) -> ServiceResult<Self> {
        let mut ledger = storage.load()?;
        let today = clock.today();
        let report = ledger.materialize_recurring(today);
        if report.added > 0 || !report.skipped.is_empty() {
            info!(
                added = report.added,
                skipped = report.skipped.len(),
                "materialized recurring expenses on open"
            );
        }
        Ok(Self {
            history: History::new(ledger),
            storage: Some(Box::new(storage)),
            clock: Box::new(clock),
        })
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Mutable access for subscribing listeners.
    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn ledger(&self) -> &Ledger {
        self.history.current()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Snapshot) + 'static) {
        self.history.subscribe(listener);
    }

    pub fn execute(&mut self, command: Command) -> ServiceResult<Outcome> {
        let today = self.today();
        match command {
            Command::Statistics(request) => Ok(Outcome::Statistics(StatisticsEngine::run(
                &request,
                self.ledger().expenses(),
            ))),
            Command::Undo => {
                self.history.undo()?;
                let revision = self.history.current_snapshot().revision();
                Ok(Outcome::Navigated {
                    revision,
                    summary: format!("Undo: back at revision {revision}"),
                })
            }
            Command::Redo => {
                self.history.redo()?;
                let revision = self.history.current_snapshot().revision();
                Ok(Outcome::Navigated {
                    revision,
                    summary: format!("Redo: forward to revision {revision}"),
                })
            }
            Command::MaterializeDue => {
                let mut working = self.history.working_copy();
                let report = working.materialize_recurring(today);
                let revision = if report.added > 0 || !report.skipped.is_empty() {
                    Some(self.history.commit(working))
                } else {
                    None
                };
                Ok(Outcome::Materialized { revision, report })
            }
            command => {
                let mut working = self.history.working_copy();
                let summary = apply(&mut working, command, today).map_err(|err| {
                    warn!(error = %err, "command rejected");
                    err
                })?;
                let revision = self.history.commit(working);
                Ok(Outcome::Committed { revision, summary })
            }
        }
    }

    pub fn save(&self) -> ServiceResult<()> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| ServiceError::Invalid("no storage configured".into()))?;
        storage.save(self.ledger())?;
        info!(
            revision = self.history.current_snapshot().revision(),
            "ledger saved"
        );
        Ok(())
    }
}

fn describe<T: LedgerEntry>(verb: &str, entry: &T) -> String {
    format!("{verb} {}: {}", T::KIND, entry.describe())
}

fn apply(ledger: &mut Ledger, command: Command, today: NaiveDate) -> ServiceResult<String> {
    let summary = match command {
        Command::AddExpense(expense) => {
            let summary = describe("Added", &expense);
            ledger.add_expense(expense)?;
            summary
        }
        Command::EditExpense {
            target,
            replacement,
        } => {
            let summary = describe("Updated", &replacement);
            ledger.replace_expense(&target, replacement)?;
            summary
        }
        Command::DeleteExpense(expense) => describe("Deleted", &ledger.remove_expense(&expense)?),
        Command::AddDebt(debt) => {
            let summary = describe("Added", &debt);
            ledger.add_debt(debt)?;
            summary
        }
        Command::EditDebt {
            target,
            replacement,
        } => {
            let summary = describe("Updated", &replacement);
            ledger.replace_debt(&target, replacement)?;
            summary
        }
        Command::DeleteDebt(debt) => describe("Deleted", &ledger.remove_debt(&debt)?),
        Command::PayDebt { debt, amount } => match ledger.pay_debt(&debt, amount)? {
            Some(remaining) => format!(
                "Paid {amount} towards {}, {} left",
                debt.name(),
                remaining.amount()
            ),
            None => describe("Settled", &debt),
        },
        Command::ConvertDebt {
            debt,
            category,
            date,
        } => {
            let expense = ledger.convert_debt(&debt, category, date)?;
            describe("Converted debt into", &expense)
        }
        Command::AddBudget(budget) => {
            let summary = describe("Added", &budget);
            ledger.add_budget(budget)?;
            summary
        }
        Command::EditBudget {
            target,
            replacement,
        } => {
            let summary = describe("Updated", &replacement);
            ledger.replace_budget(&target, replacement)?;
            summary
        }
        Command::DeleteBudget(budget) => describe("Deleted", &ledger.remove_budget(&budget)?),
        Command::AddRecurring(template) => {
            let summary = describe("Added", &template);
            ledger.add_recurring(template)?;
            with_materialized(summary, ledger, today)
        }
        Command::EditRecurring { target, edit } => {
            let stored = ledger.find_recurring(&target)?.clone();
            let edited = edit.apply(&stored)?;
            let summary = describe("Updated", &edited);
            ledger.replace_recurring(&stored, edited)?;
            with_materialized(summary, ledger, today)
        }
        Command::DeleteRecurring(template) => {
            describe("Deleted", &ledger.remove_recurring(&template)?)
        }
        Command::MaterializeDue | Command::Statistics(_) | Command::Undo | Command::Redo => {
            return Err(ServiceError::Invalid(
                "command does not modify the ledger".into(),
            ))
        }
    };
    Ok(summary)
}

/// Brings a new or edited template up to date within the same commit.
fn with_materialized(summary: String, ledger: &mut Ledger, today: NaiveDate) -> String {
    let report = ledger.materialize_recurring(today);
    if report.added == 0 {
        summary
    } else {
        format!("{summary} ({} due expense(s) added)", report.added)
    }
}
