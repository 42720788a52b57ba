// src/verify.rs
//
// Whole-file check of the battle output, for the downstream statistics:
// every row has 20 columns, two tags, two integer trophy counts and 16
// non-empty card names.

use std::path::Path;

use crate::config::consts::DECK_SIZE;
use crate::error::Result;
use crate::csv::parse_line;
use crate::file::{DataLines, EVENT_HEADER, EVENT_HEADERS};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// 1-based data row (header excluded).
    pub row: usize,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFileReport {
    pub rows: usize,
    pub violations: Vec<Violation>,
}

impl EventFileReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

fn check_side(cells: &[String]) -> Option<String> {
    if cells[0].trim().is_empty() {
        return Some(s!("empty tag"));
    }
    if cells[1].trim().parse::<i64>().is_err() {
        return Some(format!("trophies {:?} is not an integer", cells[1]));
    }
    let blank = cells[2..2 + DECK_SIZE].iter().filter(|c| c.trim().is_empty()).count();
    if blank > 0 {
        return Some(format!("{blank} unnamed card(s)"));
    }
    None
}

/// Check one data row; `None` when it satisfies the schema.
pub fn check_event_row(row: &[String]) -> Option<String> {
    if row.len() != EVENT_HEADER.len() {
        return Some(format!("{} columns, expected {}", row.len(), EVENT_HEADER.len()));
    }
    let (winner, loser) = row.split_at(2 + DECK_SIZE);
    if let Some(why) = check_side(winner) {
        return Some(join!("winner: ", &why));
    }
    check_side(loser).map(|why| join!("loser: ", &why))
}

/// Streams the file; only violations are kept.
pub fn check_event_file(path: &Path) -> Result<EventFileReport> {
    let mut report = EventFileReport::default();
    for line in DataLines::open(path, EVENT_HEADERS)? {
        let row = parse_line(&line?);
        report.rows += 1;
        if let Some(reason) = check_event_row(&row) {
            report.violations.push(Violation { row: report.rows, reason });
        }
    }
    Ok(report)
}
