//! Raw sheet rows → canonical trial balance / ledger records for one partner.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::config::{AmountFormat, ColumnAliases, ReconConfig};
use crate::error::{InputSource, ReconError, RowIssue, RowValidationError};
use crate::model::{AccountBalance, LedgerEntry, Normalized, RawRow, RawTable};
use crate::parse::{parse_amount, parse_date, parse_number};

/// Canonical form of an ICP code: trimmed, uppercase.
pub fn normalize_icp(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Canonical form of a header label for alias comparison.
pub fn normalize_header(label: &str) -> String {
    label
        .to_lowercase()
        .replace(|c: char| c == '_' || c == '-', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Index of the first header matching any alias. Aliases are tried in order,
/// so earlier aliases win when several headers qualify.
pub fn find_column(headers: &[String], aliases: &[String]) -> Option<usize> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    aliases.iter().find_map(|alias| {
        let alias = normalize_header(alias);
        if alias.is_empty() {
            return None;
        }
        normalized.iter().position(|h| *h == alias)
    })
}

fn require_column(
    source: InputSource,
    headers: &[String],
    field: &str,
    aliases: &[String],
) -> Result<usize, ReconError> {
    find_column(headers, aliases).ok_or_else(|| {
        log::warn!("{source}: no column for '{field}' among headers {headers:?} (aliases: {aliases:?})");
        ReconError::MissingColumn {
            source,
            column: field.into(),
        }
    })
}

/// Collects row problems for one row; the row is kept only if none were found.
struct RowCheck<'a> {
    source: InputSource,
    row: &'a RawRow,
    headers: &'a [String],
    issues: Vec<RowValidationError>,
}

impl<'a> RowCheck<'a> {
    fn new(source: InputSource, row: &'a RawRow, headers: &'a [String]) -> Self {
        Self {
            source,
            row,
            headers,
            issues: Vec::new(),
        }
    }

    fn push(&mut self, col: usize, issue: RowIssue) {
        self.issues.push(RowValidationError {
            source: self.source,
            row_number: self.row.row_number,
            column: self.headers.get(col).cloned().unwrap_or_default(),
            issue,
            value: self.row.get(col).to_string(),
        });
    }

    /// Non-empty cell text, or a MissingValue issue.
    fn required(&mut self, col: usize) -> Option<&'a str> {
        let v = self.row.get(col);
        if v.is_empty() {
            self.push(col, RowIssue::MissingValue);
            None
        } else {
            Some(v)
        }
    }

    /// Required amount. Numeric cells skip the configured separators.
    fn amount(&mut self, col: usize, format: &AmountFormat) -> Option<Decimal> {
        let raw = self.required(col)?;
        let parsed = if self.row.is_numeric(col) {
            parse_number(raw)
        } else {
            parse_amount(raw, format)
        };
        if parsed.is_none() {
            self.push(col, RowIssue::InvalidAmount);
        }
        parsed
    }
}

/// Partner filter shared by both normalizers. Rows with a blank partner code
/// cannot belong to any partner and are dropped like any other non-match.
fn partner_matches(row: &RawRow, partner_col: usize, icp_code: &str) -> bool {
    let partner = row.get(partner_col);
    !partner.is_empty() && normalize_icp(partner) == icp_code
}

// ---------------------------------------------------------------------------
// Trial balance
// ---------------------------------------------------------------------------

struct TrialBalanceColumns {
    account_id: usize,
    account_name: Option<usize>,
    partner_code: usize,
    balance: usize,
}

impl TrialBalanceColumns {
    fn resolve(headers: &[String], aliases: &ColumnAliases) -> Result<Self, ReconError> {
        let source = InputSource::TrialBalance;
        Ok(Self {
            account_id: require_column(source, headers, "account_id", &aliases.account_id)?,
            account_name: find_column(headers, &aliases.account_name),
            partner_code: require_column(source, headers, "partner_code", &aliases.partner_code)?,
            balance: require_column(source, headers, "balance", &aliases.amount)?,
        })
    }
}

/// Map trial balance rows to `AccountBalance`s for `icp_code`.
///
/// Rows for other partners are dropped. Rows for this partner that lack an
/// account id or a parseable balance are skipped and reported. Repeated
/// accounts are summed into one balance; the first non-empty name is kept.
pub fn normalize_trial_balance(
    table: &RawTable,
    icp_code: &str,
    config: &ReconConfig,
) -> Result<Normalized<AccountBalance>, ReconError> {
    let source = InputSource::TrialBalance;
    let cols = TrialBalanceColumns::resolve(&table.headers, &config.trial_balance.columns)?;
    let icp = normalize_icp(icp_code);

    let mut out = Normalized::default();
    let mut by_account: HashMap<String, usize> = HashMap::new();

    for row in &table.rows {
        out.total_rows += 1;
        if !partner_matches(row, cols.partner_code, &icp) {
            continue;
        }
        out.partner_rows += 1;

        let mut check = RowCheck::new(source, row, &table.headers);
        let account_id = check.required(cols.account_id);
        let balance = check.amount(cols.balance, &config.amounts);

        let (Some(account_id), Some(balance)) = (account_id, balance) else {
            out.diagnostics.extend(check.issues);
            continue;
        };
        let account_name = cols.account_name.map(|c| row.get(c)).unwrap_or("");

        if let Some(&idx) = by_account.get(account_id) {
            let existing: &mut AccountBalance = &mut out.records[idx];
            log::debug!(
                "trial balance row {}: merging repeated account {account_id} into earlier row",
                row.row_number
            );
            existing.balance += balance;
            if existing.account_name.is_empty() {
                existing.account_name = account_name.to_string();
            }
            continue;
        }

        by_account.insert(account_id.to_string(), out.records.len());
        out.records.push(AccountBalance {
            account_id: account_id.to_string(),
            account_name: account_name.to_string(),
            partner_code: icp.clone(),
            balance,
        });
    }

    log::info!(
        "trial balance: {} rows, {} for {icp}, {} accounts, {} skipped",
        out.total_rows,
        out.partner_rows,
        out.records.len(),
        out.diagnostics.len()
    );
    Ok(out)
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

struct EntryColumns {
    entry_id: Option<usize>,
    account_id: usize,
    partner_code: usize,
    amount: usize,
    description: Option<usize>,
    date: Option<usize>,
}

impl EntryColumns {
    fn resolve(headers: &[String], aliases: &ColumnAliases) -> Result<Self, ReconError> {
        let source = InputSource::Entries;
        Ok(Self {
            entry_id: find_column(headers, &aliases.entry_id),
            account_id: require_column(source, headers, "account_id", &aliases.account_id)?,
            partner_code: require_column(source, headers, "partner_code", &aliases.partner_code)?,
            amount: require_column(source, headers, "amount", &aliases.amount)?,
            description: find_column(headers, &aliases.description),
            date: find_column(headers, &aliases.date),
        })
    }
}

/// Map ledger rows to `LedgerEntry`s for `icp_code`.
///
/// Same partner filter and skip-and-report policy as the trial balance.
/// Entry ids default to `R<row number>` when the sheet has none; a date
/// that is present but unreadable fails the row.
pub fn normalize_entries(
    table: &RawTable,
    icp_code: &str,
    config: &ReconConfig,
) -> Result<Normalized<LedgerEntry>, ReconError> {
    let source = InputSource::Entries;
    let cols = EntryColumns::resolve(&table.headers, &config.entries.columns)?;
    let icp = normalize_icp(icp_code);

    let mut out = Normalized::default();

    for row in &table.rows {
        out.total_rows += 1;
        if !partner_matches(row, cols.partner_code, &icp) {
            continue;
        }
        out.partner_rows += 1;

        let mut check = RowCheck::new(source, row, &table.headers);
        let account_id = check.required(cols.account_id);
        let amount = check.amount(cols.amount, &config.amounts);

        let mut date = None;
        if let Some(c) = cols.date {
            let raw = row.get(c);
            if !raw.is_empty() {
                date = parse_date(raw, &config.amounts);
                if date.is_none() {
                    check.push(c, RowIssue::InvalidDate);
                }
            }
        }

        let (Some(account_id), Some(amount)) = (account_id, amount) else {
            out.diagnostics.extend(check.issues);
            continue;
        };
        if !check.issues.is_empty() {
            out.diagnostics.extend(check.issues);
            continue;
        }

        let entry_id = cols
            .entry_id
            .map(|c| row.get(c))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("R{}", row.row_number));

        out.records.push(LedgerEntry {
            entry_id,
            account_id: account_id.to_string(),
            partner_code: icp.clone(),
            amount,
            description: cols.description.map(|c| row.get(c)).unwrap_or("").to_string(),
            date,
        });
    }

    log::info!(
        "entries: {} rows, {} for {icp}, {} kept, {} skipped",
        out.total_rows,
        out.partner_rows,
        out.records.len(),
        out.diagnostics.len()
    );
    Ok(out)
}
