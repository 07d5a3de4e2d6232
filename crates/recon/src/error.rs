use std::fmt;

use serde::Serialize;

/// Which uploaded workbook a problem came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    TrialBalance,
    Entries,
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrialBalance => write!(f, "trial balance"),
            Self::Entries => write!(f, "entries"),
        }
    }
}

/// Fatal pipeline errors. Any of these aborts the run; no workbook is produced.
#[derive(Debug)]
pub enum ReconError {
    /// Input bytes are not a readable spreadsheet, or the sheet has no header row.
    MalformedWorkbook { source: InputSource, message: String },
    /// A required column could not be found under any of its aliases.
    MissingColumn { source: InputSource, column: String },
    /// The ICP code matched zero rows in both inputs.
    NoMatchingPartner { icp_code: String },
    /// The ICP code is empty after trimming.
    InvalidIcpCode,
    /// Output serialization failed.
    WorkbookWrite(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (negative tolerance, empty alias list, etc.).
    ConfigValidation(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedWorkbook { source, message } => {
                write!(f, "malformed {source} workbook: {message}")
            }
            Self::MissingColumn { source, column } => {
                write!(f, "{source} workbook: missing column '{column}'")
            }
            Self::NoMatchingPartner { icp_code } => {
                write!(f, "ICP code '{icp_code}' matches no rows in either input")
            }
            Self::InvalidIcpCode => write!(f, "ICP code is empty"),
            Self::WorkbookWrite(msg) => write!(f, "cannot write reconciliation workbook: {msg}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

// ---------------------------------------------------------------------------
// Row-level diagnostics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowIssue {
    MissingValue,
    InvalidAmount,
    InvalidDate,
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingValue => write!(f, "missing_value"),
            Self::InvalidAmount => write!(f, "invalid_amount"),
            Self::InvalidDate => write!(f, "invalid_date"),
        }
    }
}

/// A skipped input row. Collected, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowValidationError {
    pub source: InputSource,
    /// 1-based row number in the source sheet.
    pub row_number: usize,
    pub column: String,
    pub issue: RowIssue,
    pub value: String,
}

impl fmt::Display for RowValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issue {
            RowIssue::MissingValue => write!(
                f,
                "{} row {}: missing value in '{}'",
                self.source, self.row_number, self.column
            ),
            RowIssue::InvalidAmount => write!(
                f,
                "{} row {}: cannot parse amount '{}' in '{}'",
                self.source, self.row_number, self.value, self.column
            ),
            RowIssue::InvalidDate => write!(
                f,
                "{} row {}: cannot parse date '{}' in '{}'",
                self.source, self.row_number, self.value, self.column
            ),
        }
    }
}

impl std::error::Error for RowValidationError {}
