//! CSV feed parsing.
//!
//! The feed is a published spreadsheet export: a header row followed by
//! `name, district[, ...]` rows. Extra columns are ignored. Rows that cannot
//! produce a valid record are skipped and reported, never fatal.

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use tracing::{info, warn};

use crate::models::FacilityRecord;

/// Why a row was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipReason {
    /// Fewer than two fields
    Malformed,
    /// Name or district blank after trimming
    Incomplete,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedRow {
    /// 1-based line in the feed text (the header is line 1)
    pub line: u64,
    pub reason: SkipReason,
    pub raw: String,
}

/// Parsed feed contents, in feed order
#[derive(Debug, Clone, Default)]
pub struct FeedReport {
    pub records: Vec<FacilityRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Parse feed text into facility records.
///
/// Each line is read on its own, so an unbalanced quote only costs the row
/// it appears in.
pub fn parse_feed(text: &str) -> FeedReport {
    let mut report = FeedReport::default();

    // Header occupies line 1
    for (index, text_line) in text.trim().lines().enumerate().skip(1) {
        let line = index as u64 + 1;

        let row = match read_row(text_line) {
            Ok(Some(row)) => row,
            Ok(None) => StringRecord::new(),
            Err(e) => {
                warn!("Row {}: unreadable ({}). Skipped.", line, e);
                report.skipped.push(SkippedRow {
                    line,
                    reason: SkipReason::Malformed,
                    raw: text_line.to_string(),
                });
                continue;
            }
        };

        if row.len() < 2 {
            warn!("Row {}: malformed row {:?}. Skipped.", line, text_line);
            report.skipped.push(SkippedRow {
                line,
                reason: SkipReason::Malformed,
                raw: text_line.to_string(),
            });
            continue;
        }

        match FacilityRecord::new(&row[0], &row[1]) {
            Some(record) => report.records.push(record),
            None => {
                warn!("Row {}: incomplete data. Skipped.", line);
                report.skipped.push(SkippedRow {
                    line,
                    reason: SkipReason::Incomplete,
                    raw: text_line.to_string(),
                });
            }
        }
    }

    info!(
        "Parsed {} facilities ({} rows skipped)",
        report.records.len(),
        report.skipped.len()
    );
    report
}

/// Fields of a single feed line. Blank lines yield `None`.
fn read_row(text_line: &str) -> Result<Option<StringRecord>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text_line.as_bytes());
    reader.records().next().transpose()
}
