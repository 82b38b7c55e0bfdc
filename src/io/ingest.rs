//! CSV ingest for implied-rate quotes.
//!
//! Expected schema (case-insensitive, extra columns ignored):
//!
//! ```text
//! date,implied_rate
//! 2024-01-02,5.33
//! 2024-01-31,5.29
//! ```
//!
//! Rows are kept in file order. The tree rejects out-of-order dates rather than
//! sorting them, so ingest must not reorder either. Unparseable rows are
//! skipped and reported.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::RateQuote;
use crate::error::AppError;

const DATE_COLUMNS: [&str; 3] = ["date", "meeting_date", "meeting_dates"];
const RATE_COLUMNS: [&str; 5] = ["implied_rate", "rate", "value", "px_last", "implied"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: quotes in file order + rows that were skipped.
#[derive(Debug, Clone)]
pub struct IngestedQuotes {
    pub quotes: Vec<RateQuote>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load quotes from a CSV file on disk.
pub fn load_quotes_csv(path: &Path) -> Result<IngestedQuotes, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let ingested = read_quotes(file)?;
    info!(
        path = %path.display(),
        rows_read = ingested.rows_read,
        rows_used = ingested.quotes.len(),
        "quotes loaded"
    );
    Ok(ingested)
}

/// Parse quotes from any CSV reader.
pub fn read_quotes<R: Read>(source: R) -> Result<IngestedQuotes, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = find_column(&header_map, &DATE_COLUMNS)
        .ok_or_else(|| AppError::new(2, "Missing required column: `date`"))?;
    let rate_idx = find_column(&header_map, &RATE_COLUMNS)
        .ok_or_else(|| AppError::new(2, "Missing required column: `implied_rate`"))?;

    let mut quotes = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header; CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, date_idx, rate_idx));

        match parsed {
            Ok(quote) => quotes.push(quote),
            Err(message) => {
                warn!(line, error = %message, "skipping quote row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if quotes.is_empty() {
        return Err(AppError::new(3, "No valid quote rows found in CSV."));
    }

    Ok(IngestedQuotes {
        quotes,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase().replace(' ', "_")
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|n| header_map.get(*n).copied())
}

fn parse_row(record: &StringRecord, date_idx: usize, rate_idx: usize) -> Result<RateQuote, String> {
    let date = parse_date(get_value(record, date_idx, "date")?)?;
    let raw_rate = get_value(record, rate_idx, "implied_rate")?;
    let implied_rate = raw_rate
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("Invalid implied rate '{raw_rate}'."))?;
    Ok(RateQuote::new(date, implied_rate))
}

fn get_value<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

/// Parse a quote date.
///
/// ISO dates are preferred; meeting calendars are often written US-style
/// (`7/27/2022`), so that is accepted too.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, MM/DD/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}
