use std::fmt;

use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};

/// Day-first date layout used for display and persistence.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| LedgerError::InvalidInput(format!("`{raw}` is not a dd-mm-yyyy date")))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    /// Advances `from` by `steps` whole units.
    ///
    /// Month and year steps are measured from `from` itself and clamp to the
    /// last day of shorter months, so 31-01 + 1 month is the last day of February.
    pub fn add_to(self, from: NaiveDate, steps: u32) -> Option<NaiveDate> {
        match self {
            TimeUnit::Day => from.checked_add_signed(Duration::days(steps as i64)),
            TimeUnit::Week => from.checked_add_signed(Duration::weeks(steps as i64)),
            TimeUnit::Month => from.checked_add_months(Months::new(steps)),
            TimeUnit::Year => steps
                .checked_mul(12)
                .and_then(|months| from.checked_add_months(Months::new(months))),
        }
    }

    pub fn next_date(self, from: NaiveDate) -> Option<NaiveDate> {
        self.add_to(from, 1)
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeUnit::Day => "Daily",
            TimeUnit::Week => "Weekly",
            TimeUnit::Month => "Monthly",
            TimeUnit::Year => "Yearly",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Closed date interval; both `start` and `end` belong to the window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(LedgerError::InvalidInput(format!(
                "window end {} precedes start {}",
                format_date(end),
                format_date(start)
            )));
        }
        Ok(Self { start, end })
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Window covering one `unit` starting at `start`, i.e. up to the day before
    /// the next unit begins.
    pub fn spanning(start: NaiveDate, unit: TimeUnit) -> Result<Self> {
        let end = unit
            .next_date(start)
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| {
                LedgerError::InvalidInput(format!(
                    "{} period from {} is out of range",
                    unit,
                    format_date(start)
                ))
            })?;
        Self::new(start, end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Cuts the window into consecutive `unit`-sized slices, the last one clipped to
    /// `end`. At most `limit` slices are produced; the flag reports whether any were cut.
    pub fn slices(&self, unit: TimeUnit, limit: usize) -> (Vec<DateWindow>, bool) {
        let mut slices = Vec::new();
        let mut start = self.start;
        let mut step = 0u32;
        loop {
            if start > self.end {
                return (slices, false);
            }
            if slices.len() >= limit {
                return (slices, true);
            }
            let next = unit.add_to(self.start, step + 1);
            let end = next
                .and_then(|date| date.pred_opt())
                .map_or(self.end, |date| date.min(self.end));
            slices.push(DateWindow { start, end });
            match next {
                Some(date) => start = date,
                None => return (slices, false),
            }
            step += 1;
        }
    }

    pub fn label(&self) -> String {
        if self.start == self.end {
            format_date(self.start)
        } else {
            format!("{} to {}", format_date(self.start), format_date(self.end))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_steps_clamp_to_month_end() {
        let start = date(2024, 1, 31);
        assert_eq!(TimeUnit::Month.add_to(start, 1), Some(date(2024, 2, 29)));
        assert_eq!(TimeUnit::Month.add_to(start, 2), Some(date(2024, 3, 31)));
        assert_eq!(TimeUnit::Year.add_to(date(2024, 2, 29), 1), Some(date(2025, 2, 28)));
    }

    #[test]
    fn spanning_window_ends_before_next_period() {
        let window = DateWindow::spanning(date(2024, 2, 1), TimeUnit::Month).unwrap();
        assert_eq!(window.end, date(2024, 2, 29));
        let week = DateWindow::spanning(date(2024, 2, 1), TimeUnit::Week).unwrap();
        assert_eq!(week.end, date(2024, 2, 7));
        let day = DateWindow::spanning(date(2024, 2, 1), TimeUnit::Day).unwrap();
        assert_eq!(day.start, day.end);
    }

    #[test]
    fn window_membership_is_inclusive() {
        let window = DateWindow::new(date(2020, 1, 1), date(2020, 1, 5)).unwrap();
        assert!(window.contains(date(2020, 1, 1)));
        assert!(window.contains(date(2020, 1, 5)));
        assert!(!window.contains(date(2020, 1, 6)));
    }

    #[test]
    fn rejects_inverted_window() {
        let err = DateWindow::new(date(2020, 1, 5), date(2020, 1, 1)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
    }

    #[test]
    fn slices_clip_last_interval() {
        let window = DateWindow::new(date(2024, 1, 1), date(2024, 3, 10)).unwrap();
        let (slices, truncated) = window.slices(TimeUnit::Month, 10);
        assert!(!truncated);
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].end, date(2024, 1, 31));
        assert_eq!(slices[2].start, date(2024, 3, 1));
        assert_eq!(slices[2].end, date(2024, 3, 10));
    }

    #[test]
    fn slices_stop_at_limit() {
        let window = DateWindow::new(date(2024, 1, 1), date(2024, 1, 15)).unwrap();
        let (slices, truncated) = window.slices(TimeUnit::Day, 10);
        assert_eq!(slices.len(), 10);
        assert!(truncated);

        let (exact, truncated) = window.slices(TimeUnit::Day, 15);
        assert_eq!(exact.len(), 15);
        assert!(!truncated);
    }

    #[test]
    fn dates_roundtrip_through_day_first_format() {
        let parsed = parse_date("05-01-2020").unwrap();
        assert_eq!(parsed, date(2020, 1, 5));
        assert_eq!(format_date(parsed), "05-01-2020");
        assert!(parse_date("2020-01-05").is_err());
    }
}
