use chrono::NaiveDate;

use super::{amount::Amount, category::Category, time_interval::DateWindow};

/// A single dated spending entry. Edits go through the `with_*` builders, which
/// hand back a new value and leave the original untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    name: String,
    amount: Amount,
    date: NaiveDate,
    category: Category,
    remarks: String,
}

impl Expense {
    pub fn new(
        name: impl Into<String>,
        amount: Amount,
        date: NaiveDate,
        category: Category,
        remarks: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            date,
            category,
            remarks: remarks.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn remarks(&self) -> &str {
        &self.remarks
    }

    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn with_amount(&self, amount: Amount) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }

    pub fn with_date(&self, date: NaiveDate) -> Self {
        Self {
            date,
            ..self.clone()
        }
    }

    pub fn with_category(&self, category: Category) -> Self {
        Self {
            category,
            ..self.clone()
        }
    }

    pub fn with_remarks(&self, remarks: impl Into<String>) -> Self {
        Self {
            remarks: remarks.into(),
            ..self.clone()
        }
    }
}

/// Selects expenses by optional category and optional date window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub category: Option<Category>,
    pub window: Option<DateWindow>,
}

impl ExpenseFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn in_window(window: DateWindow) -> Self {
        Self {
            category: None,
            window: Some(window),
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        self.category.map_or(true, |wanted| expense.category == wanted)
            && self
                .window
                .map_or(true, |window| window.contains(expense.date))
    }
}
