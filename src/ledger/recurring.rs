use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    expense::Expense,
    time_interval::{format_date, TimeUnit},
};
use crate::errors::{LedgerError, Result};

pub const MAX_OCCURRENCES: u32 = 999;

/// Appended to the name of every occurrence generated from a template.
pub const GENERATED_SUFFIX: &str = " (recurring)";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Daily,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn unit(self) -> TimeUnit {
        match self {
            Frequency::Daily => TimeUnit::Day,
            Frequency::Monthly => TimeUnit::Month,
            Frequency::Yearly => TimeUnit::Year,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Frequency {
    type Err = LedgerError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            _ => Err(LedgerError::InvalidInput(format!("unknown frequency `{raw}`"))),
        }
    }
}

/// A recurring charge: a base expense repeated `occurrence_count` times.
///
/// The projected occurrences are derived once when the template is built. The
/// watermark (`last_materialized`) is the last date up to which occurrences have
/// been pushed into the ledger; it only ever moves forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurringTemplate {
    base: Expense,
    frequency: Frequency,
    occurrence_count: u32,
    last_materialized: NaiveDate,
    occurrences: Vec<Expense>,
}

impl RecurringTemplate {
    /// Builds a fresh template whose watermark sits the day before its first occurrence.
    pub fn new(base: Expense, frequency: Frequency, occurrence_count: u32) -> Result<Self> {
        let watermark = base.date().pred_opt().ok_or_else(|| {
            LedgerError::InvalidInput(format!("{} is out of range", format_date(base.date())))
        })?;
        Self::with_watermark(base, frequency, occurrence_count, watermark)
    }

    /// Rebuilds a template with an explicit watermark, e.g. when loading from storage.
    pub fn with_watermark(
        base: Expense,
        frequency: Frequency,
        occurrence_count: u32,
        last_materialized: NaiveDate,
    ) -> Result<Self> {
        if !(1..=MAX_OCCURRENCES).contains(&occurrence_count) {
            return Err(LedgerError::InvalidInput(format!(
                "occurrence count {occurrence_count} must be between 1 and {MAX_OCCURRENCES}"
            )));
        }
        let occurrences = project_occurrences(&base, frequency, occurrence_count)?;
        Ok(Self {
            base,
            frequency,
            occurrence_count,
            last_materialized,
            occurrences,
        })
    }

    /// Replaces the base expense, keeping the schedule and the watermark.
    pub fn with_base(&self, base: Expense) -> Result<Self> {
        Self::with_watermark(
            base,
            self.frequency,
            self.occurrence_count,
            self.last_materialized,
        )
    }

    /// Changes frequency and count, keeping the base expense and the watermark.
    pub fn with_schedule(&self, frequency: Frequency, occurrence_count: u32) -> Result<Self> {
        Self::with_watermark(
            self.base.clone(),
            frequency,
            occurrence_count,
            self.last_materialized,
        )
    }

    /// Discards the watermark so every occurrence is due again from the base date.
    pub fn reset_schedule(&self) -> Result<Self> {
        Self::new(self.base.clone(), self.frequency, self.occurrence_count)
    }

    pub fn base(&self) -> &Expense {
        &self.base
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn occurrence_count(&self) -> u32 {
        self.occurrence_count
    }

    pub fn last_materialized(&self) -> NaiveDate {
        self.last_materialized
    }

    pub fn occurrences(&self) -> &[Expense] {
        &self.occurrences
    }

    /// Occurrences after the watermark and on or before `today`.
    pub fn due_occurrences(&self, today: NaiveDate) -> impl Iterator<Item = &Expense> {
        let watermark = self.last_materialized;
        self.occurrences
            .iter()
            .filter(move |occurrence| occurrence.date() > watermark && occurrence.date() <= today)
    }

    /// First occurrence not yet materialized.
    pub fn next_due(&self) -> Option<NaiveDate> {
        self.occurrences
            .iter()
            .map(Expense::date)
            .find(|date| *date > self.last_materialized)
    }

    pub fn is_exhausted(&self) -> bool {
        self.next_due().is_none()
    }

    /// Moves the watermark to `today`. Never moves it backwards; returns whether it changed.
    pub fn advance_watermark(&mut self, today: NaiveDate) -> bool {
        if today > self.last_materialized {
            self.last_materialized = today;
            true
        } else {
            false
        }
    }
}

fn project_occurrences(
    base: &Expense,
    frequency: Frequency,
    occurrence_count: u32,
) -> Result<Vec<Expense>> {
    let name = format!("{}{}", base.name(), GENERATED_SUFFIX);
    let template = base.with_name(name);
    (0..occurrence_count)
        .map(|index| {
            let date = frequency
                .unit()
                .add_to(base.date(), index)
                .ok_or_else(|| {
                    LedgerError::InvalidInput(format!(
                        "occurrence {} of `{}` falls outside the supported date range",
                        index + 1,
                        base.name()
                    ))
                })?;
            Ok(template.with_date(date))
        })
        .collect()
}

/// Templates with advanced watermarks plus the expenses that fell due.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Materialization {
    pub templates: Vec<RecurringTemplate>,
    pub expenses: Vec<Expense>,
}

impl Materialization {
    pub fn into_parts(self) -> (Vec<RecurringTemplate>, Vec<Expense>) {
        (self.templates, self.expenses)
    }
}

/// Expands recurring templates into concrete expenses.
pub struct RecurringExpander;

impl RecurringExpander {
    /// Emits every occurrence due by `today` that lies past its template's watermark,
    /// then advances each watermark to `today`. Calling it again with the same
    /// `today` emits nothing.
    pub fn materialize(templates: &[RecurringTemplate], today: NaiveDate) -> Materialization {
        let mut updated = Vec::with_capacity(templates.len());
        let mut expenses = Vec::new();
        for template in templates {
            let before = expenses.len();
            expenses.extend(template.due_occurrences(today).cloned());
            let mut next = template.clone();
            next.advance_watermark(today);
            debug!(
                template = template.base().name(),
                emitted = expenses.len() - before,
                watermark = %format_date(next.last_materialized()),
                "expanded recurring template"
            );
            updated.push(next);
        }
        Materialization {
            templates: updated,
            expenses,
        }
    }
}
