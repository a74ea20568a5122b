//! Category/time-window aggregation over the expense collection.

pub mod table;

use std::{collections::BTreeMap, fmt};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::errors::Result;
use crate::ledger::{
    amount::percentage_of, Category, DateWindow, Expense, ExpenseFilter, TimeUnit,
};

pub use table::Table;

pub const DEFAULT_TREND_INTERVALS: usize = 10;

/// A statistics row key: one category, or the synthetic total across all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    Category(Category),
    All,
}

impl Bucket {
    pub fn label(self) -> &'static str {
        match self {
            Bucket::Category(category) => category.label(),
            Bucket::All => "ALL",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsRequest {
    Single(DateWindow),
    Compare {
        first: DateWindow,
        second: DateWindow,
    },
    Trend {
        window: DateWindow,
        step: TimeUnit,
        max_intervals: usize,
    },
}

impl StatsRequest {
    pub fn single(window: DateWindow) -> Self {
        StatsRequest::Single(window)
    }

    pub fn compare(first: DateWindow, second: DateWindow) -> Self {
        StatsRequest::Compare { first, second }
    }

    /// Compares two periods of length `step` starting at the given dates.
    pub fn compare_periods(
        first_start: NaiveDate,
        second_start: NaiveDate,
        step: TimeUnit,
    ) -> Result<Self> {
        Ok(StatsRequest::Compare {
            first: DateWindow::spanning(first_start, step)?,
            second: DateWindow::spanning(second_start, step)?,
        })
    }

    pub fn trend(window: DateWindow, step: TimeUnit) -> Self {
        Self::trend_with_limit(window, step, DEFAULT_TREND_INTERVALS)
    }

    pub fn trend_with_limit(window: DateWindow, step: TimeUnit, max_intervals: usize) -> Self {
        StatsRequest::Trend {
            window,
            step,
            max_intervals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRow {
    pub bucket: Bucket,
    pub amount: Decimal,
    pub count: usize,
    pub percentage: Decimal,
}

impl StatRow {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Totals for one window: a row per category in display order plus the `ALL` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub window: DateWindow,
    pub categories: Vec<StatRow>,
    pub total: StatRow,
}

impl Summary {
    pub fn compute(window: DateWindow, expenses: &[Expense]) -> Self {
        let filter = ExpenseFilter::in_window(window);
        let mut tallies: BTreeMap<Category, (Decimal, usize)> = Category::VARIANTS
            .into_iter()
            .map(|category| (category, (Decimal::ZERO, 0)))
            .collect();
        for expense in expenses.iter().filter(|expense| filter.matches(expense)) {
            let tally = tallies.entry(expense.category()).or_default();
            tally.0 += expense.amount().value();
            tally.1 += 1;
        }

        let total_amount: Decimal = tallies.values().map(|(amount, _)| *amount).sum();
        let total_count: usize = tallies.values().map(|(_, count)| *count).sum();
        let categories = tallies
            .into_iter()
            .map(|(category, (amount, count))| StatRow {
                bucket: Bucket::Category(category),
                amount,
                count,
                percentage: percentage_of(amount, total_amount),
            })
            .collect();
        let total = StatRow {
            bucket: Bucket::All,
            amount: total_amount,
            count: total_count,
            percentage: percentage_of(total_amount, total_amount),
        };
        Self {
            window,
            categories,
            total,
        }
    }

    pub fn row(&self, bucket: Bucket) -> Option<&StatRow> {
        match bucket {
            Bucket::All => Some(&self.total),
            Bucket::Category(_) => self.categories.iter().find(|row| row.bucket == bucket),
        }
    }

    /// Every row, categories first, `ALL` last.
    pub fn rows(&self) -> impl Iterator<Item = &StatRow> {
        self.categories.iter().chain(std::iter::once(&self.total))
    }

    /// Categories with at least one entry, followed by the `ALL` row.
    pub fn non_empty_rows(&self) -> Vec<&StatRow> {
        self.categories
            .iter()
            .filter(|row| !row.is_empty())
            .chain(std::iter::once(&self.total))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trend {
    pub window: DateWindow,
    pub step: TimeUnit,
    pub slices: Vec<Summary>,
    /// Set when the window needed more slices than were allowed.
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Single(Summary),
    Compare { first: Summary, second: Summary },
    Trend(Trend),
}

impl Report {
    pub fn is_truncated(&self) -> bool {
        matches!(self, Report::Trend(trend) if trend.truncated)
    }
}

pub struct StatisticsEngine;

impl StatisticsEngine {
    pub fn run(request: &StatsRequest, expenses: &[Expense]) -> Report {
        match request {
            StatsRequest::Single(window) => Report::Single(Summary::compute(*window, expenses)),
            StatsRequest::Compare { first, second } => Report::Compare {
                first: Summary::compute(*first, expenses),
                second: Summary::compute(*second, expenses),
            },
            StatsRequest::Trend {
                window,
                step,
                max_intervals,
            } => {
                let (windows, truncated) = window.slices(*step, *max_intervals);
                if truncated {
                    debug!(
                        window = %window.label(),
                        limit = max_intervals,
                        "trend truncated"
                    );
                }
                let slices = windows
                    .into_iter()
                    .map(|slice| Summary::compute(slice, expenses))
                    .collect();
                Report::Trend(Trend {
                    window: *window,
                    step: *step,
                    slices,
                    truncated,
                })
            }
        }
    }
}
