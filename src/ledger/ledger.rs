use chrono::NaiveDate;
use tracing::{debug, warn};

use super::{
    amount::Amount,
    budget::Budget,
    category::Category,
    debt::Debt,
    expense::{Expense, ExpenseFilter},
    recurring::{Materialization, RecurringExpander, RecurringTemplate},
    time_interval::format_date,
};
use crate::errors::{LedgerError, Result};

/// Identity rule used for duplicate checks inside a collection.
///
/// Two entries with the same identity may still differ in other fields; the
/// ledger never holds both.
pub trait LedgerEntry: Clone {
    const KIND: &'static str;

    fn same_identity(&self, other: &Self) -> bool;

    fn describe(&self) -> String;
}

impl LedgerEntry for Expense {
    const KIND: &'static str = "expense";

    fn same_identity(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.amount() == other.amount()
            && self.date() == other.date()
    }

    fn describe(&self) -> String {
        format!("{} {} on {}", self.name(), self.amount(), format_date(self.date()))
    }
}

impl LedgerEntry for Debt {
    const KIND: &'static str = "debt";

    fn same_identity(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.amount() == other.amount()
            && self.date() == other.date()
    }

    fn describe(&self) -> String {
        format!("{} {} on {}", self.name(), self.amount(), format_date(self.date()))
    }
}

impl LedgerEntry for RecurringTemplate {
    const KIND: &'static str = "recurring expense";

    fn same_identity(&self, other: &Self) -> bool {
        self.base().same_identity(other.base())
    }

    fn describe(&self) -> String {
        format!("{} {}", self.base().describe(), self.frequency())
    }
}

impl LedgerEntry for Budget {
    const KIND: &'static str = "budget";

    fn same_identity(&self, other: &Self) -> bool {
        self.category() == other.category()
    }

    fn describe(&self) -> String {
        format!("{} budget of {}", self.category(), self.amount())
    }
}

/// Ordered collection holding at most one entry per identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryList<T> {
    items: Vec<T>,
}

impl<T> Default for EntryList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: LedgerEntry> EntryList<T> {
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self, entry: &T) -> Option<usize> {
        self.items.iter().position(|item| item.same_identity(entry))
    }

    pub fn contains(&self, entry: &T) -> bool {
        self.position(entry).is_some()
    }

    /// The stored entry sharing `entry`'s identity.
    pub fn get(&self, entry: &T) -> Option<&T> {
        self.position(entry).map(|index| &self.items[index])
    }

    pub fn add(&mut self, entry: T) -> Result<()> {
        if self.contains(&entry) {
            return Err(duplicate(&entry));
        }
        self.items.push(entry);
        Ok(())
    }

    pub fn remove(&mut self, entry: &T) -> Result<T> {
        let index = self.position(entry).ok_or_else(|| missing(entry))?;
        Ok(self.items.remove(index))
    }

    /// Swaps `old` for `new` in place. Fails without touching the collection when
    /// `old` is absent or `new` collides with a different entry.
    pub fn replace(&mut self, old: &T, new: T) -> Result<T> {
        let index = self.position(old).ok_or_else(|| missing(old))?;
        let collides = self
            .items
            .iter()
            .enumerate()
            .any(|(other, item)| other != index && item.same_identity(&new));
        if collides {
            return Err(duplicate(&new));
        }
        Ok(std::mem::replace(&mut self.items[index], new))
    }
}

fn duplicate<T: LedgerEntry>(entry: &T) -> LedgerError {
    LedgerError::DuplicateEntity(format!("{} `{}` already exists", T::KIND, entry.describe()))
}

fn missing<T: LedgerEntry>(entry: &T) -> LedgerError {
    LedgerError::EntityNotFound(format!("{} `{}` does not exist", T::KIND, entry.describe()))
}

/// Result of pushing due recurring occurrences into a ledger.
#[derive(Debug, Default)]
pub struct MaterializeReport {
    pub added: usize,
    pub skipped: Vec<LedgerError>,
}

/// The whole in-memory state: expenses, debts, budgets and recurring templates.
///
/// Cloning a ledger copies every collection, so a clone never observes later
/// mutations of the original.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    expenses: EntryList<Expense>,
    debts: EntryList<Debt>,
    budgets: EntryList<Budget>,
    recurring: EntryList<RecurringTemplate>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expenses(&self) -> &[Expense] {
        self.expenses.as_slice()
    }

    pub fn debts(&self) -> &[Debt] {
        self.debts.as_slice()
    }

    pub fn budgets(&self) -> &[Budget] {
        self.budgets.as_slice()
    }

    pub fn recurring(&self) -> &[RecurringTemplate] {
        self.recurring.as_slice()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
            && self.debts.is_empty()
            && self.budgets.is_empty()
            && self.recurring.is_empty()
    }

    pub fn expenses_matching(&self, filter: &ExpenseFilter) -> Vec<&Expense> {
        self.expenses
            .as_slice()
            .iter()
            .filter(|expense| filter.matches(expense))
            .collect()
    }

    pub fn budget_for(&self, category: Category) -> Option<&Budget> {
        self.budgets
            .as_slice()
            .iter()
            .find(|budget| budget.category() == category)
    }

    pub fn add_expense(&mut self, expense: Expense) -> Result<()> {
        self.expenses.add(expense)?;
        self.refresh_budgets();
        Ok(())
    }

    pub fn remove_expense(&mut self, expense: &Expense) -> Result<Expense> {
        let removed = self.expenses.remove(expense)?;
        self.refresh_budgets();
        Ok(removed)
    }

    pub fn replace_expense(&mut self, old: &Expense, new: Expense) -> Result<Expense> {
        let replaced = self.expenses.replace(old, new)?;
        self.refresh_budgets();
        Ok(replaced)
    }

    pub fn add_debt(&mut self, debt: Debt) -> Result<()> {
        self.debts.add(debt)
    }

    pub fn remove_debt(&mut self, debt: &Debt) -> Result<Debt> {
        self.debts.remove(debt)
    }

    pub fn replace_debt(&mut self, old: &Debt, new: Debt) -> Result<Debt> {
        self.debts.replace(old, new)
    }

    pub fn add_budget(&mut self, mut budget: Budget) -> Result<()> {
        budget.recompute(self.expenses.as_slice());
        self.budgets.add(budget)
    }

    pub fn remove_budget(&mut self, budget: &Budget) -> Result<Budget> {
        self.budgets.remove(budget)
    }

    pub fn replace_budget(&mut self, old: &Budget, mut new: Budget) -> Result<Budget> {
        new.recompute(self.expenses.as_slice());
        self.budgets.replace(old, new)
    }

    /// The stored template with `template`'s identity, carrying the current watermark.
    pub fn find_recurring(&self, template: &RecurringTemplate) -> Result<&RecurringTemplate> {
        self.recurring.get(template).ok_or_else(|| missing(template))
    }

    pub fn add_recurring(&mut self, template: RecurringTemplate) -> Result<()> {
        self.recurring.add(template)
    }

    pub fn remove_recurring(&mut self, template: &RecurringTemplate) -> Result<RecurringTemplate> {
        self.recurring.remove(template)
    }

    pub fn replace_recurring(
        &mut self,
        old: &RecurringTemplate,
        new: RecurringTemplate,
    ) -> Result<RecurringTemplate> {
        self.recurring.replace(old, new)
    }

    /// Applies a payment to a debt. Paying the full amount (or more) clears the debt;
    /// a partial payment leaves a debt with the remaining amount, which is returned.
    pub fn pay_debt(&mut self, debt: &Debt, payment: Amount) -> Result<Option<Debt>> {
        if payment >= debt.amount() {
            self.debts.remove(debt)?;
            debug!(debt = debt.name(), "debt settled in full");
            return Ok(None);
        }
        let remaining = Amount::new(debt.amount().value() - payment.value())?;
        let reduced = debt.with_amount(remaining);
        self.debts.replace(debt, reduced.clone())?;
        debug!(debt = debt.name(), remaining = %remaining, "debt partially paid");
        Ok(Some(reduced))
    }

    /// Turns a debt into an expense. Either both collections change or neither does.
    pub fn convert_debt(
        &mut self,
        debt: &Debt,
        category: Category,
        date: NaiveDate,
    ) -> Result<Expense> {
        if !self.debts.contains(debt) {
            return Err(missing(debt));
        }
        let expense = debt.to_expense(category, date);
        if self.expenses.contains(&expense) {
            return Err(duplicate(&expense));
        }
        self.debts.remove(debt)?;
        self.expenses.add(expense.clone())?;
        self.refresh_budgets();
        Ok(expense)
    }

    /// Pushes every recurring occurrence due by `today` into the expenses and
    /// advances each template's watermark. An occurrence that collides with an
    /// existing expense is skipped and reported; the rest still go in.
    pub fn materialize_recurring(&mut self, today: NaiveDate) -> MaterializeReport {
        let Materialization {
            templates,
            expenses,
        } = RecurringExpander::materialize(self.recurring.as_slice(), today);
        let mut report = MaterializeReport::default();
        for expense in expenses {
            match self.expenses.add(expense) {
                Ok(()) => report.added += 1,
                Err(err) => {
                    warn!(error = %err, "skipping recurring occurrence");
                    report.skipped.push(err);
                }
            }
        }
        self.recurring.items = templates;
        if report.added > 0 {
            self.refresh_budgets();
        }
        debug!(
            added = report.added,
            skipped = report.skipped.len(),
            today = %format_date(today),
            "materialized recurring expenses"
        );
        report
    }

    /// Recomputes every budget's spend from the current expenses.
    pub fn refresh_budgets(&mut self) {
        let expenses = self.expenses.as_slice();
        for budget in self.budgets.items.iter_mut() {
            budget.recompute(expenses);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{debt::DebtKind, recurring::Frequency};
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cents(value: i64) -> Amount {
        Amount::from_cents(value).unwrap()
    }

    fn expense(name: &str, amount: i64, day: u32) -> Expense {
        Expense::new(name, cents(amount), date(2024, 1, day), Category::Food, "")
    }

    #[test]
    fn add_rejects_same_identity_even_with_other_fields_changed() {
        let mut ledger = Ledger::new();
        ledger.add_expense(expense("Lunch", 1200, 3)).unwrap();
        let twin = expense("Lunch", 1200, 3).with_category(Category::Others);
        let err = ledger.add_expense(twin).unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateEntity(_)));
        assert_eq!(ledger.expenses().len(), 1);

        ledger.add_expense(expense("Lunch", 1300, 3)).unwrap();
        assert_eq!(ledger.expenses().len(), 2);
    }

    #[test]
    fn remove_reports_missing_entries() {
        let mut ledger = Ledger::new();
        let err = ledger.remove_expense(&expense("Lunch", 1200, 3)).unwrap_err();
        assert!(matches!(err, LedgerError::EntityNotFound(_)));
    }

    #[test]
    fn replace_colliding_with_third_entry_leaves_ledger_untouched() {
        let mut ledger = Ledger::new();
        let a = expense("A", 100, 1);
        let b = expense("B", 200, 2);
        ledger.add_expense(a.clone()).unwrap();
        ledger.add_expense(b.clone()).unwrap();
        let before = ledger.clone();

        let err = ledger
            .replace_expense(&a, b.with_remarks("clash"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateEntity(_)));
        assert_eq!(ledger, before);
    }

    #[test]
    fn replace_may_keep_its_own_identity() {
        let mut ledger = Ledger::new();
        let a = expense("A", 100, 1);
        ledger.add_expense(a.clone()).unwrap();
        ledger.replace_expense(&a, a.with_remarks("note")).unwrap();
        assert_eq!(ledger.expenses()[0].remarks(), "note");
    }

    #[test]
    fn one_budget_per_category() {
        let mut ledger = Ledger::new();
        let budget = Budget::new(
            Category::Food,
            cents(30_000),
            date(2024, 1, 1),
            date(2024, 1, 31),
            "",
        )
        .unwrap();
        ledger.add_budget(budget.clone()).unwrap();
        let other = Budget::new(
            Category::Food,
            cents(10_000),
            date(2024, 2, 1),
            date(2024, 2, 28),
            "",
        )
        .unwrap();
        assert!(matches!(
            ledger.add_budget(other),
            Err(LedgerError::DuplicateEntity(_))
        ));
    }

    #[test]
    fn budgets_follow_expense_changes() {
        let mut ledger = Ledger::new();
        let budget = Budget::new(
            Category::Food,
            cents(30_000),
            date(2024, 1, 1),
            date(2024, 1, 31),
            "",
        )
        .unwrap();
        ledger.add_budget(budget).unwrap();
        let lunch = expense("Lunch", 15_000, 5);
        ledger.add_expense(lunch.clone()).unwrap();
        let stored = ledger.budget_for(Category::Food).unwrap();
        assert_eq!(stored.total_spent(), Decimal::from(150));
        assert_eq!(stored.percentage(), Decimal::from(50));

        ledger.remove_expense(&lunch).unwrap();
        assert_eq!(
            ledger.budget_for(Category::Food).unwrap().total_spent(),
            Decimal::ZERO
        );
    }

    #[test]
    fn partial_payment_reduces_debt() {
        let mut ledger = Ledger::new();
        let debt = Debt::new(DebtKind::Incurred, "Alex", cents(5_000), date(2024, 1, 1), "");
        ledger.add_debt(debt.clone()).unwrap();

        let remaining = ledger.pay_debt(&debt, cents(2_000)).unwrap().unwrap();
        assert_eq!(remaining.amount(), cents(3_000));
        assert_eq!(ledger.debts().len(), 1);

        assert!(ledger.pay_debt(&remaining, cents(3_000)).unwrap().is_none());
        assert!(ledger.debts().is_empty());
    }

    #[test]
    fn convert_debt_is_atomic() {
        let mut ledger = Ledger::new();
        let debt = Debt::new(DebtKind::Incurred, "Lunch", cents(1_200), date(2024, 1, 3), "");
        ledger.add_debt(debt.clone()).unwrap();
        ledger.add_expense(expense("Lunch", 1_200, 3)).unwrap();
        let before = ledger.clone();

        let err = ledger
            .convert_debt(&debt, Category::Food, date(2024, 1, 3))
            .unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateEntity(_)));
        assert_eq!(ledger, before);

        let converted = ledger
            .convert_debt(&debt, Category::Food, date(2024, 1, 4))
            .unwrap();
        assert_eq!(converted.date(), date(2024, 1, 4));
        assert!(ledger.debts().is_empty());
        assert_eq!(ledger.expenses().len(), 2);
    }

    #[test]
    fn materialize_skips_collisions_and_continues() {
        let mut ledger = Ledger::new();
        let base = Expense::new("Gym", cents(5_000), date(2024, 1, 1), Category::Health, "");
        let template = RecurringTemplate::new(base, Frequency::Monthly, 3).unwrap();
        ledger.add_recurring(template.clone()).unwrap();
        ledger
            .add_expense(template.occurrences()[1].clone())
            .unwrap();

        let report = ledger.materialize_recurring(date(2024, 3, 1));
        assert_eq!(report.added, 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(
            report.skipped[0],
            LedgerError::DuplicateEntity(_)
        ));
        assert_eq!(ledger.expenses().len(), 3);
        assert_eq!(ledger.recurring()[0].last_materialized(), date(2024, 3, 1));

        let again = ledger.materialize_recurring(date(2024, 3, 1));
        assert_eq!(again.added, 0);
        assert!(again.skipped.is_empty());
        assert_eq!(ledger.expenses().len(), 3);
    }

    #[test]
    fn find_recurring_returns_stored_watermark() {
        let mut ledger = Ledger::new();
        let base = Expense::new("Gym", cents(5_000), date(2024, 1, 1), Category::Health, "");
        let template = RecurringTemplate::new(base, Frequency::Monthly, 3).unwrap();
        ledger.add_recurring(template.clone()).unwrap();
        ledger.materialize_recurring(date(2024, 2, 15));

        let stored = ledger.find_recurring(&template).unwrap();
        assert_eq!(stored.last_materialized(), date(2024, 2, 15));
        assert_eq!(template.last_materialized(), date(2023, 12, 31));

        ledger.remove_recurring(&template).unwrap();
        assert!(matches!(
            ledger.find_recurring(&template),
            Err(LedgerError::EntityNotFound(_))
        ));
    }
}
