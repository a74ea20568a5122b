mod common;

use common::{amount, date, expense};
use expense_ledger::engine::{Command, FixedClock, ServiceError, Session};
use expense_ledger::errors::LedgerError;
use expense_ledger::ledger::{Budget, Category, Debt, DebtKind, ExpenseFilter, DateWindow, Ledger};
use rust_decimal::Decimal;

fn food_budget() -> Budget {
    Budget::new(
        Category::Food,
        amount("300.00"),
        date(2024, 4, 1),
        date(2024, 4, 30),
        "",
    )
    .unwrap()
}

#[test]
fn budget_tracks_spend_through_commands() {
    let mut session = Session::new(Ledger::new(), FixedClock(date(2024, 4, 20)));
    session.execute(Command::AddBudget(food_budget())).unwrap();
    let groceries = expense("Groceries", "150.00", date(2024, 4, 3), Category::Food);
    session
        .execute(Command::AddExpense(groceries.clone()))
        .unwrap();
    session
        .execute(Command::AddExpense(expense(
            "Bus",
            "2.00",
            date(2024, 4, 3),
            Category::Transport,
        )))
        .unwrap();

    let budget = session.ledger().budget_for(Category::Food).unwrap();
    assert_eq!(budget.percentage(), Decimal::new(5000, 2));
    assert!(!budget.is_exceeded());

    session
        .execute(Command::EditExpense {
            target: groceries.clone(),
            replacement: groceries.with_amount(amount("320.00")),
        })
        .unwrap();
    let budget = session.ledger().budget_for(Category::Food).unwrap();
    assert!(budget.is_exceeded());
    assert_eq!(budget.remaining(), Decimal::new(-2000, 2));

    session.execute(Command::Undo).unwrap();
    let budget = session.ledger().budget_for(Category::Food).unwrap();
    assert_eq!(budget.total_spent(), Decimal::new(15000, 2));
}

#[test]
fn second_budget_for_category_is_rejected() {
    let mut ledger = Ledger::new();
    ledger.add_budget(food_budget()).unwrap();
    let other = Budget::new(
        Category::Food,
        amount("50.00"),
        date(2024, 5, 1),
        date(2024, 5, 31),
        "",
    )
    .unwrap();
    assert!(matches!(
        ledger.add_budget(other),
        Err(LedgerError::DuplicateEntity(_))
    ));
}

#[test]
fn converting_a_debt_moves_it_into_expenses() {
    let mut session = Session::new(Ledger::new(), FixedClock(date(2024, 4, 20)));
    let debt = Debt::new(
        DebtKind::Incurred,
        "Sam",
        amount("35.00"),
        date(2024, 4, 2),
        "dinner",
    );
    session.execute(Command::AddDebt(debt.clone())).unwrap();
    session
        .execute(Command::ConvertDebt {
            debt: debt.clone(),
            category: Category::Food,
            date: date(2024, 4, 10),
        })
        .unwrap();

    assert!(session.ledger().debts().is_empty());
    let april = ExpenseFilter::in_window(
        DateWindow::new(date(2024, 4, 1), date(2024, 4, 30)).unwrap(),
    )
    .with_category(Category::Food);
    let converted = session.ledger().expenses_matching(&april);
    assert_eq!(converted.len(), 1);
    assert_eq!(converted[0].name(), "Sam");
    assert_eq!(converted[0].remarks(), "dinner");

    let err = session
        .execute(Command::ConvertDebt {
            debt,
            category: Category::Food,
            date: date(2024, 4, 10),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Ledger(LedgerError::EntityNotFound(_))
    ));
}

#[test]
fn full_payment_settles_debt() {
    let mut session = Session::new(Ledger::new(), FixedClock(date(2024, 4, 20)));
    let debt = Debt::new(DebtKind::Lent, "Kim", amount("12.00"), date(2024, 4, 1), "");
    session.execute(Command::AddDebt(debt.clone())).unwrap();
    session
        .execute(Command::PayDebt {
            debt,
            amount: amount("15.00"),
        })
        .unwrap();
    assert!(session.ledger().debts().is_empty());
}
