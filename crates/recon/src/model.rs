use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::RowValidationError;

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// One sheet as read from an uploaded workbook: a header row plus data rows.
///
/// Header labels are kept verbatim; the normalizers decide what they mean.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// A data row. `cells` is aligned with `RawTable::headers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based row number in the source sheet.
    pub row_number: usize,
    pub cells: Vec<String>,
    /// Columns whose source cell was a number rather than text. Empty when
    /// the source has no cell types.
    pub numeric: Vec<bool>,
}

impl RawRow {
    /// Cell text at `col`, trimmed. Missing cells read as empty.
    pub fn get(&self, col: usize) -> &str {
        self.cells.get(col).map(|s| s.trim()).unwrap_or("")
    }

    /// Whether the cell at `col` came from a numeric cell. Its text is then
    /// plain float output and must not be read with locale separators.
    pub fn is_numeric(&self, col: usize) -> bool {
        self.numeric.get(col).copied().unwrap_or(false)
    }
}

impl RawTable {
    /// Iterate rows as (header, value) pairs.
    pub fn row_mapping<'a>(&'a self, row: &'a RawRow) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.headers
            .iter()
            .enumerate()
            .map(move |(i, h)| (h.as_str(), row.get(i)))
    }
}

// ---------------------------------------------------------------------------
// Canonical records
// ---------------------------------------------------------------------------

/// One trial balance account for the requested partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountBalance {
    pub account_id: String,
    pub account_name: String,
    pub partner_code: String,
    pub balance: Decimal,
}

/// One ledger line for the requested partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub entry_id: String,
    pub account_id: String,
    pub partner_code: String,
    pub amount: Decimal,
    pub description: String,
    pub date: Option<NaiveDate>,
}

/// Output of a normalizer: the rows that survived plus diagnostics for those that didn't.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub diagnostics: Vec<RowValidationError>,
    /// Rows whose partner code matched, whether or not they validated.
    pub partner_rows: usize,
    /// Data rows inspected.
    pub total_rows: usize,
}

impl<T> Default for Normalized<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            diagnostics: Vec::new(),
            partner_rows: 0,
            total_rows: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconStatus {
    Matched,
    Variance,
    MissingInTb,
    MissingInEntries,
}

impl std::fmt::Display for ReconStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Matched => write!(f, "MATCHED"),
            Self::Variance => write!(f, "VARIANCE"),
            Self::MissingInTb => write!(f, "MISSING_IN_TB"),
            Self::MissingInEntries => write!(f, "MISSING_IN_ENTRIES"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationRow {
    pub account_id: String,
    pub account_name: String,
    pub trial_balance_amount: Decimal,
    pub entries_total: Decimal,
    pub variance: Decimal,
    pub status: ReconStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub accounts: usize,
    pub matched: usize,
    pub variances: usize,
    pub missing_in_tb: usize,
    pub missing_in_entries: usize,
    pub trial_balance_total: Decimal,
    pub entries_total: Decimal,
    pub net_variance: Decimal,
}

/// Everything produced by one engine run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub icp_code: String,
    pub rows: Vec<ReconciliationRow>,
    pub summary: ReconSummary,
    pub balances: Vec<AccountBalance>,
    pub entries: Vec<LedgerEntry>,
    pub trial_balance_diagnostics: Vec<RowValidationError>,
    pub entries_diagnostics: Vec<RowValidationError>,
}

impl ReconResult {
    /// All skipped-row diagnostics, trial balance first.
    pub fn diagnostics(&self) -> impl Iterator<Item = &RowValidationError> {
        self.trial_balance_diagnostics
            .iter()
            .chain(self.entries_diagnostics.iter())
    }
}
