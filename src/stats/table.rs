use std::fmt;

use crate::ledger::amount::format_money;

use super::{Bucket, Report, StatRow, Summary, Trend};

const COLUMN_SEPARATOR: &str = " | ";
const RULE_SEPARATOR: &str = "-+-";
const TRUNCATION_NOTE: &str = "(later intervals omitted)";

/// Plain-text grid produced from a statistics report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub truncated: bool,
}

impl Table {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
            truncated: false,
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.header.iter().map(|cell| cell.chars().count()).collect();
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(idx) {
                    Some(width) => *width = (*width).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }

    /// First column left-aligned, the rest right-aligned.
    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut lines = Vec::with_capacity(self.rows.len() + 3);
        lines.push(render_line(&self.header, &widths));
        lines.push(
            widths
                .iter()
                .map(|width| "-".repeat(*width))
                .collect::<Vec<_>>()
                .join(RULE_SEPARATOR),
        );
        for row in &self.rows {
            lines.push(render_line(row, &widths));
        }
        if self.truncated {
            lines.push(TRUNCATION_NOTE.to_string());
        }
        lines.join("\n")
    }
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    let line = widths
        .iter()
        .enumerate()
        .map(|(idx, width)| {
            let cell = cells.get(idx).map(String::as_str).unwrap_or("");
            if idx == 0 {
                format!("{:<width$}", cell, width = *width)
            } else {
                format!("{:>width$}", cell, width = *width)
            }
        })
        .collect::<Vec<_>>()
        .join(COLUMN_SEPARATOR);
    line.trim_end().to_string()
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn header(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|cell| cell.to_string()).collect()
}

fn figures(row: &StatRow) -> [String; 3] {
    [
        format_money(row.amount),
        row.count.to_string(),
        format_money(row.percentage),
    ]
}

impl Report {
    pub fn to_table(&self) -> Table {
        match self {
            Report::Single(summary) => single_table(summary),
            Report::Compare { first, second } => compare_table(first, second),
            Report::Trend(trend) => trend_table(trend),
        }
    }
}

fn single_table(summary: &Summary) -> Table {
    let mut table = Table::new(header(&["Category", "Amount", "Entries", "Percentage"]));
    for row in summary.non_empty_rows() {
        let mut cells = vec![row.bucket.to_string()];
        cells.extend(figures(row));
        table.push_row(cells);
    }
    table
}

fn compare_table(first: &Summary, second: &Summary) -> Table {
    let mut table = Table::new(vec![
        "Category".to_string(),
        format!("Amount [{}]", first.window.label()),
        "Entries".to_string(),
        "Percentage".to_string(),
        format!("Amount [{}]", second.window.label()),
        "Entries".to_string(),
        "Percentage".to_string(),
    ]);
    for (left, right) in first.rows().zip(second.rows()) {
        if left.is_empty() && right.is_empty() && left.bucket != Bucket::All {
            continue;
        }
        let mut cells = vec![left.bucket.to_string()];
        cells.extend(figures(left));
        cells.extend(figures(right));
        table.push_row(cells);
    }
    table
}

/// Category rows across one amount column per slice. Every category is kept.
fn trend_table(trend: &Trend) -> Table {
    let mut columns = vec!["Category".to_string()];
    columns.extend(trend.slices.iter().map(|slice| slice.window.label()));
    let mut table = Table::new(columns);
    if let Some(first) = trend.slices.first() {
        for bucket in first.rows().map(|row| row.bucket) {
            let mut cells = vec![bucket.to_string()];
            cells.extend(trend.slices.iter().map(|slice| {
                slice
                    .row(bucket)
                    .map_or_else(String::new, |row| format_money(row.amount))
            }));
            table.push_row(cells);
        }
    }
    table.truncated = trend.truncated;
    table
}
