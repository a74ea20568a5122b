#![allow(dead_code)]

use chrono::NaiveDate;
use expense_ledger::ledger::{Amount, Category, Expense};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn amount(raw: &str) -> Amount {
    raw.parse().expect("valid amount")
}

pub fn expense(name: &str, raw_amount: &str, on: NaiveDate, category: Category) -> Expense {
    Expense::new(name, amount(raw_amount), on, category, "")
}
