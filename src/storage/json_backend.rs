use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::{
    config::Config,
    errors::{LedgerError, Result},
    ledger::{
        format_date, parse_date, Amount, Budget, Category, Debt, DebtKind, Expense, Frequency,
        Ledger, RecurringTemplate,
    },
};

use super::StorageBackend;

const TMP_SUFFIX: &str = "tmp";

/// Stores the ledger as one pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at the ledger file location resolved from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.ledger_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for JsonStorage {
    fn load(&self) -> Result<Ledger> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no ledger file yet, starting empty");
            return Ok(Ledger::new());
        }
        load_ledger_from_path(&self.path)
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        save_ledger_to_path(ledger, &self.path)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerDocument {
    #[serde(default)]
    expenses: Vec<ExpenseRecord>,
    #[serde(default)]
    debts: Vec<DebtRecord>,
    #[serde(default)]
    budgets: Vec<BudgetRecord>,
    #[serde(default)]
    recurring: Vec<RecurringRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ExpenseRecord {
    name: String,
    amount: String,
    date: String,
    category: Category,
    #[serde(default)]
    remarks: String,
}

impl ExpenseRecord {
    fn from_expense(expense: &Expense) -> Self {
        Self {
            name: expense.name().to_string(),
            amount: expense.amount().to_string(),
            date: format_date(expense.date()),
            category: expense.category(),
            remarks: expense.remarks().to_string(),
        }
    }

    fn into_expense(self) -> Result<Expense> {
        Ok(Expense::new(
            self.name,
            self.amount.parse::<Amount>()?,
            parse_date(&self.date)?,
            self.category,
            self.remarks,
        ))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct DebtRecord {
    kind: DebtKind,
    name: String,
    amount: String,
    date: String,
    #[serde(default)]
    remarks: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct BudgetRecord {
    category: Category,
    amount: String,
    start_date: String,
    end_date: String,
    #[serde(default)]
    remarks: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct RecurringRecord {
    #[serde(flatten)]
    base: ExpenseRecord,
    frequency: Frequency,
    occurrence_count: u32,
    last_materialized: String,
}

impl LedgerDocument {
    fn from_ledger(ledger: &Ledger) -> Self {
        Self {
            expenses: ledger
                .expenses()
                .iter()
                .map(ExpenseRecord::from_expense)
                .collect(),
            debts: ledger
                .debts()
                .iter()
                .map(|debt| DebtRecord {
                    kind: debt.kind(),
                    name: debt.name().to_string(),
                    amount: debt.amount().to_string(),
                    date: format_date(debt.date()),
                    remarks: debt.remarks().to_string(),
                })
                .collect(),
            budgets: ledger
                .budgets()
                .iter()
                .map(|budget| BudgetRecord {
                    category: budget.category(),
                    amount: budget.amount().to_string(),
                    start_date: format_date(budget.start_date()),
                    end_date: format_date(budget.end_date()),
                    remarks: budget.remarks().to_string(),
                })
                .collect(),
            recurring: ledger
                .recurring()
                .iter()
                .map(|template| RecurringRecord {
                    base: ExpenseRecord::from_expense(template.base()),
                    frequency: template.frequency(),
                    occurrence_count: template.occurrence_count(),
                    last_materialized: format_date(template.last_materialized()),
                })
                .collect(),
        }
    }

    /// Rebuilds the ledger through its own insert operations, so duplicate
    /// records are rejected and budget totals and occurrences are re-derived.
    fn into_ledger(self) -> Result<Ledger> {
        let mut ledger = Ledger::new();
        for record in self.expenses {
            ledger.add_expense(record.into_expense()?)?;
        }
        for record in self.debts {
            ledger.add_debt(Debt::new(
                record.kind,
                record.name,
                record.amount.parse::<Amount>()?,
                parse_date(&record.date)?,
                record.remarks,
            ))?;
        }
        for record in self.budgets {
            ledger.add_budget(Budget::new(
                record.category,
                record.amount.parse::<Amount>()?,
                parse_date(&record.start_date)?,
                parse_date(&record.end_date)?,
                record.remarks,
            )?)?;
        }
        for record in self.recurring {
            let last_materialized = parse_date(&record.last_materialized)?;
            ledger.add_recurring(RecurringTemplate::with_watermark(
                record.base.into_expense()?,
                record.frequency,
                record.occurrence_count,
                last_materialized,
            )?)?;
        }
        Ok(ledger)
    }
}

pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&LedgerDocument::from_ledger(ledger))?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "ledger saved");
    Ok(())
}

pub fn load_ledger_from_path(path: &Path) -> Result<Ledger> {
    let data = fs::read_to_string(path)?;
    let document: LedgerDocument = serde_json::from_str(&data)?;
    let ledger = document
        .into_ledger()
        .map_err(|err| LedgerError::Storage(format!("{}: {err}", path.display())))?;
    debug!(
        path = %path.display(),
        expenses = ledger.expenses().len(),
        recurring = ledger.recurring().len(),
        "ledger loaded"
    );
    Ok(ledger)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
