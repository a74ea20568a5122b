use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{
    amount::{percentage_of, Amount},
    category::Category,
    expense::{Expense, ExpenseFilter},
    time_interval::{format_date, DateWindow},
};
use crate::errors::{LedgerError, Result};

/// A spending limit for one category over a closed date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Budget {
    category: Category,
    amount: Amount,
    start_date: NaiveDate,
    end_date: NaiveDate,
    remarks: String,
    total_spent: Decimal,
}

impl Budget {
    pub fn new(
        category: Category,
        amount: Amount,
        start_date: NaiveDate,
        end_date: NaiveDate,
        remarks: impl Into<String>,
    ) -> Result<Self> {
        if end_date < start_date {
            return Err(LedgerError::InvalidInput(format!(
                "budget end {} precedes start {}",
                format_date(end_date),
                format_date(start_date)
            )));
        }
        Ok(Self {
            category,
            amount,
            start_date,
            end_date,
            remarks: remarks.into(),
            total_spent: Decimal::ZERO,
        })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn remarks(&self) -> &str {
        &self.remarks
    }

    pub fn total_spent(&self) -> Decimal {
        self.total_spent
    }

    pub fn window(&self) -> DateWindow {
        DateWindow {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Share of the budget already spent, truncated to two decimal places.
    pub fn percentage(&self) -> Decimal {
        percentage_of(self.total_spent, self.amount.value())
    }

    pub fn remaining(&self) -> Decimal {
        self.amount.value() - self.total_spent
    }

    pub fn is_exceeded(&self) -> bool {
        self.total_spent > self.amount.value()
    }

    pub fn with_total_spent(&self, total_spent: Decimal) -> Self {
        Self {
            total_spent,
            ..self.clone()
        }
    }

    pub(crate) fn recompute(&mut self, expenses: &[Expense]) {
        let filter = ExpenseFilter::in_window(self.window()).with_category(self.category);
        self.total_spent = expenses
            .iter()
            .filter(|expense| filter.matches(expense))
            .map(|expense| expense.amount().value())
            .sum();
    }
}
