use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use thiserror::Error;
use tracing::info;

use crate::form::{validate_submission, IntakeError, PreferenceSubmission, PreferenceSubmissionRequest};
use crate::store::{ScheduleStore, StoreError};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to open import file: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: {source}")]
    InvalidRow { line: u64, source: IntakeError },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub employees: usize,
    pub preferences: usize,
}

/// Splits a preferences cell such as "Monday-Morning, Friday-Evening" into tokens
fn split_tokens(cell: &str) -> Vec<String> {
    cell.split([',', ';'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads preference submissions from CSV
///
/// A first row naming a `name` or `preferences` column is a header and picks
/// the columns by name. Otherwise the file has no header and the first two
/// columns hold the name and the preferences. Every row goes through the same
/// validation as the web form, and the first invalid row fails the whole load
/// with its line number.
pub fn load_submissions<R: Read>(input: R) -> Result<Vec<PreferenceSubmission>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(input);

    let mut records = reader.records().peekable();
    let (mut name_col, mut prefs_col) = (0, 1);

    // Find column indices
    let (name_header, prefs_header) = match records.peek() {
        Some(Ok(first)) => (
            first.iter().position(|h| h.to_lowercase().contains("name")),
            first.iter().position(|h| h.to_lowercase().contains("preference")),
        ),
        _ => (None, None),
    };
    if name_header.is_some() || prefs_header.is_some() {
        name_col = name_header.unwrap_or(0);
        prefs_col = prefs_header.unwrap_or(1);
        records.next();
    }

    let mut submissions = Vec::new();
    for result in records {
        let record = result?;

        // Skip blank lines
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let req = PreferenceSubmissionRequest {
            name: record.get(name_col).unwrap_or("").to_string(),
            preferences: split_tokens(record.get(prefs_col).unwrap_or("")),
        };
        let submission = validate_submission(&req).map_err(|source| ImportError::InvalidRow { line, source })?;
        submissions.push(submission);
    }

    Ok(submissions)
}

pub fn load_submissions_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<PreferenceSubmission>, ImportError> {
    let file = File::open(path)?;
    load_submissions(file)
}

/// Stores every submission in file order, in a single transaction
pub fn import_submissions(
    store: &ScheduleStore,
    submissions: &[PreferenceSubmission],
) -> Result<ImportSummary, ImportError> {
    store.submit_many(submissions)?;
    let summary = ImportSummary {
        employees: submissions.len(),
        preferences: submissions.iter().map(|s| s.slots.len()).sum(),
    };
    info!(employees = summary.employees, preferences = summary.preferences, "import finished");
    Ok(summary)
}
