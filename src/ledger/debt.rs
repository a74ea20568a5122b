use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{amount::Amount, category::Category, expense::Expense};
use crate::errors::LedgerError;

/// Direction of a debt relative to the ledger owner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebtKind {
    /// Money the owner has to pay back.
    Incurred,
    /// Money someone else owes the owner.
    Lent,
}

impl DebtKind {
    pub fn label(self) -> &'static str {
        match self {
            DebtKind::Incurred => "INCURRED",
            DebtKind::Lent => "LENT",
        }
    }
}

impl fmt::Display for DebtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DebtKind {
    type Err = LedgerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "INCURRED" => Ok(DebtKind::Incurred),
            "LENT" => Ok(DebtKind::Lent),
            _ => Err(LedgerError::InvalidInput(format!("unknown debt type `{raw}`"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debt {
    kind: DebtKind,
    name: String,
    amount: Amount,
    date: NaiveDate,
    remarks: String,
}

impl Debt {
    pub fn new(
        kind: DebtKind,
        name: impl Into<String>,
        amount: Amount,
        date: NaiveDate,
        remarks: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            amount,
            date,
            remarks: remarks.into(),
        }
    }

    pub fn kind(&self) -> DebtKind {
        self.kind
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

    pub fn remarks(&self) -> &str {
        &self.remarks
    }

    pub fn with_amount(&self, amount: Amount) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }

    pub fn with_remarks(&self, remarks: impl Into<String>) -> Self {
        Self {
            remarks: remarks.into(),
            ..self.clone()
        }
    }

    /// The expense recorded when this debt is settled as spending.
    pub fn to_expense(&self, category: Category, date: NaiveDate) -> Expense {
        Expense::new(
            self.name.clone(),
            self.amount,
            date,
            category,
            self.remarks.clone(),
        )
    }
}
