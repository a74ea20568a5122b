//! Structured requests handed to the session by a command parser, and their outcomes.

use chrono::NaiveDate;

use crate::errors::Result;
use crate::ledger::{
    Amount, Budget, Category, Debt, Expense, Frequency, MaterializeReport, RecurringTemplate,
};
use crate::stats::{Report, StatsRequest};

/// Changes applied to an existing recurring template. Unset fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecurringEdit {
    pub base: Option<Expense>,
    pub frequency: Option<Frequency>,
    pub occurrence_count: Option<u32>,
    /// Re-derive the watermark from the base date after applying the edit.
    pub reset_schedule: bool,
}

impl RecurringEdit {
    pub fn base(base: Expense) -> Self {
        Self {
            base: Some(base),
            ..Self::default()
        }
    }

    pub fn schedule(frequency: Frequency, occurrence_count: u32) -> Self {
        Self {
            frequency: Some(frequency),
            occurrence_count: Some(occurrence_count),
            ..Self::default()
        }
    }

    pub fn and_reset(mut self) -> Self {
        self.reset_schedule = true;
        self
    }

    pub fn apply(&self, template: &RecurringTemplate) -> Result<RecurringTemplate> {
        let mut edited = match &self.base {
            Some(base) => template.with_base(base.clone())?,
            None => template.clone(),
        };
        if self.frequency.is_some() || self.occurrence_count.is_some() {
            edited = edited.with_schedule(
                self.frequency.unwrap_or(edited.frequency()),
                self.occurrence_count.unwrap_or(edited.occurrence_count()),
            )?;
        }
        if self.reset_schedule {
            edited = edited.reset_schedule()?;
        }
        Ok(edited)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddExpense(Expense),
    EditExpense {
        target: Expense,
        replacement: Expense,
    },
    DeleteExpense(Expense),
    AddDebt(Debt),
    EditDebt {
        target: Debt,
        replacement: Debt,
    },
    DeleteDebt(Debt),
    PayDebt {
        debt: Debt,
        amount: Amount,
    },
    ConvertDebt {
        debt: Debt,
        category: Category,
        date: NaiveDate,
    },
    AddBudget(Budget),
    EditBudget {
        target: Budget,
        replacement: Budget,
    },
    DeleteBudget(Budget),
    AddRecurring(RecurringTemplate),
    EditRecurring {
        target: RecurringTemplate,
        edit: RecurringEdit,
    },
    DeleteRecurring(RecurringTemplate),
    MaterializeDue,
    Statistics(StatsRequest),
    Undo,
    Redo,
}

#[derive(Debug)]
pub enum Outcome {
    Committed {
        revision: u64,
        summary: String,
    },
    /// `revision` is `None` when nothing was due.
    Materialized {
        revision: Option<u64>,
        report: MaterializeReport,
    },
    Statistics(Report),
    Navigated {
        revision: u64,
        summary: String,
    },
}

impl Outcome {
    pub fn summary(&self) -> String {
        match self {
            Outcome::Committed { summary, .. } | Outcome::Navigated { summary, .. } => {
                summary.clone()
            }
            Outcome::Materialized { report, .. } => match report.skipped.len() {
                0 => format!("Added {} recurring expense(s)", report.added),
                skipped => format!(
                    "Added {} recurring expense(s), skipped {} duplicate(s)",
                    report.added, skipped
                ),
            },
            Outcome::Statistics(report) => report.to_table().render(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn template() -> RecurringTemplate {
        let base = Expense::new(
            "Rent",
            Amount::from_cents(50_000).unwrap(),
            date(2024, 1, 1),
            Category::Bills,
            "",
        );
        RecurringTemplate::with_watermark(base, Frequency::Monthly, 12, date(2024, 3, 15))
            .unwrap()
    }

    #[test]
    fn base_edit_keeps_schedule_and_watermark() {
        let original = template();
        let new_base = original.base().with_amount(Amount::from_cents(55_000).unwrap());
        let edited = RecurringEdit::base(new_base.clone()).apply(&original).unwrap();
        assert_eq!(edited.base(), &new_base);
        assert_eq!(edited.occurrence_count(), 12);
        assert_eq!(edited.last_materialized(), date(2024, 3, 15));
    }

    #[test]
    fn partial_schedule_edit_keeps_other_field() {
        let edit = RecurringEdit {
            occurrence_count: Some(3),
            ..RecurringEdit::default()
        };
        let edited = edit.apply(&template()).unwrap();
        assert_eq!(edited.frequency(), Frequency::Monthly);
        assert_eq!(edited.occurrences().len(), 3);
        assert_eq!(edited.last_materialized(), date(2024, 3, 15));
    }

    #[test]
    fn reset_rewinds_watermark() {
        let edited = RecurringEdit::schedule(Frequency::Yearly, 2)
            .and_reset()
            .apply(&template())
            .unwrap();
        assert_eq!(edited.last_materialized(), date(2023, 12, 31));
    }
}
