use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Reconciliation settings. Every section is optional; `ReconConfig::default()`
/// is what the pipeline uses when no file is given.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    /// Largest absolute variance still reported as MATCHED.
    #[serde(default)]
    pub tolerance: Decimal,
    #[serde(default)]
    pub amounts: AmountFormat,
    #[serde(default = "InputConfig::trial_balance")]
    pub trial_balance: InputConfig,
    #[serde(default = "InputConfig::entries")]
    pub entries: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            tolerance: Decimal::ZERO,
            amounts: AmountFormat::default(),
            trial_balance: InputConfig::trial_balance(),
            entries: InputConfig::entries(),
            output: OutputConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Amounts + dates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AmountFormat {
    /// '.' (1,234.56) or ',' (1.234,56).
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,
    /// chrono format strings tried in order for text dates.
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
}

impl Default for AmountFormat {
    fn default() -> Self {
        Self {
            decimal_separator: default_decimal_separator(),
            date_formats: default_date_formats(),
        }
    }
}

fn default_decimal_separator() -> char {
    '.'
}

fn default_date_formats() -> Vec<String> {
    ["%Y-%m-%d", "%Y-%m-%d %H:%M:%S", "%d/%m/%Y", "%d.%m.%Y", "%d-%b-%Y"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Per-workbook settings. Missing alias lists fall back to the built-in table
/// for that input.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    /// Worksheet to read. First sheet when absent.
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub columns: ColumnAliases,
}

impl InputConfig {
    pub fn trial_balance() -> Self {
        Self {
            sheet: None,
            columns: ColumnAliases::trial_balance_defaults(),
        }
    }

    pub fn entries() -> Self {
        Self {
            sheet: None,
            columns: ColumnAliases::entries_defaults(),
        }
    }
}

/// Header aliases per canonical field. Matching ignores case, surrounding
/// whitespace, and treats `_` / `-` as spaces.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnAliases {
    #[serde(default)]
    pub account_id: Vec<String>,
    #[serde(default)]
    pub account_name: Vec<String>,
    #[serde(default)]
    pub partner_code: Vec<String>,
    /// Trial balance: balance column. Entries: amount column.
    #[serde(default)]
    pub amount: Vec<String>,
    #[serde(default)]
    pub entry_id: Vec<String>,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub date: Vec<String>,
}

fn aliases(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

const ACCOUNT_ID_ALIASES: &[&str] = &[
    "account",
    "account id",
    "account code",
    "account number",
    "account no",
    "account no.",
    "acct",
    "acct no",
    "gl account",
    "gl code",
    "g/l account",
];

const PARTNER_ALIASES: &[&str] = &[
    "icp",
    "icp code",
    "partner",
    "partner code",
    "trading partner",
    "intercompany partner",
    "ic partner",
    "counterparty",
];

impl ColumnAliases {
    pub fn trial_balance_defaults() -> Self {
        Self {
            account_id: aliases(ACCOUNT_ID_ALIASES),
            account_name: aliases(&[
                "account name",
                "account description",
                "name",
                "description",
                "gl account name",
            ]),
            partner_code: aliases(PARTNER_ALIASES),
            amount: aliases(&[
                "balance",
                "closing balance",
                "ending balance",
                "net balance",
                "balance amount",
                "amount",
            ]),
            entry_id: Vec::new(),
            description: Vec::new(),
            date: Vec::new(),
        }
    }

    pub fn entries_defaults() -> Self {
        Self {
            account_id: aliases(ACCOUNT_ID_ALIASES),
            account_name: Vec::new(),
            partner_code: aliases(PARTNER_ALIASES),
            amount: aliases(&["amount", "net amount", "value", "local amount", "amount lc", "amount (lc)"]),
            entry_id: aliases(&[
                "entry id",
                "entry no",
                "journal id",
                "journal no",
                "je number",
                "document number",
                "document no",
                "reference",
                "ref",
            ]),
            description: aliases(&["description", "text", "memo", "narration", "line description"]),
            date: aliases(&["date", "posting date", "entry date", "document date", "transaction date"]),
        }
    }

    /// Fill empty lists from `defaults`.
    fn fill_from(&mut self, defaults: ColumnAliases) {
        let ColumnAliases {
            account_id,
            account_name,
            partner_code,
            amount,
            entry_id,
            description,
            date,
        } = defaults;
        for (slot, default) in [
            (&mut self.account_id, account_id),
            (&mut self.account_name, account_name),
            (&mut self.partner_code, partner_code),
            (&mut self.amount, amount),
            (&mut self.entry_id, entry_id),
            (&mut self.description, description),
            (&mut self.date, date),
        ] {
            if slot.is_empty() {
                *slot = default;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    /// Add normalized "Trial Balance" and "Entries" sheets.
    #[serde(default)]
    pub include_inputs: bool,
    /// Add a "Diagnostics" sheet listing skipped rows.
    #[serde(default)]
    pub include_diagnostics: bool,
    /// Document creation time stamped into the workbook. Pinned so identical
    /// input produces identical bytes.
    #[serde(default)]
    pub created: Option<NaiveDateTime>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sheet_name: default_sheet_name(),
            include_inputs: false,
            include_diagnostics: false,
            created: None,
        }
    }
}

fn default_sheet_name() -> String {
    "Reconciliation".into()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let mut config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.trial_balance.columns.fill_from(ColumnAliases::trial_balance_defaults());
        config.entries.columns.fill_from(ColumnAliases::entries_defaults());
        config.validate()?;
        Ok(config)
    }

    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.tolerance < Decimal::ZERO {
            return Err(ReconError::ConfigValidation(format!(
                "tolerance must not be negative, got {}",
                self.tolerance
            )));
        }

        if !matches!(self.amounts.decimal_separator, '.' | ',') {
            return Err(ReconError::ConfigValidation(format!(
                "decimal_separator must be '.' or ',', got '{}'",
                self.amounts.decimal_separator
            )));
        }

        if self.amounts.date_formats.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least one date format is required".into(),
            ));
        }

        for (label, input) in [("trial_balance", &self.trial_balance), ("entries", &self.entries)] {
            let cols = &input.columns;
            for (field, list) in [
                ("account_id", &cols.account_id),
                ("partner_code", &cols.partner_code),
                ("amount", &cols.amount),
            ] {
                if list.iter().all(|a| a.trim().is_empty()) {
                    return Err(ReconError::ConfigValidation(format!(
                        "{label}.columns.{field} needs at least one alias"
                    )));
                }
            }
        }

        let name = self.output.sheet_name.trim();
        if name.is_empty() || name.chars().count() > 31 {
            return Err(ReconError::ConfigValidation(format!(
                "output.sheet_name must be 1-31 characters, got '{}'",
                self.output.sheet_name
            )));
        }
        if name.contains(&['[', ']', ':', '*', '?', '/', '\\'][..]) {
            return Err(ReconError::ConfigValidation(format!(
                "output.sheet_name contains a character Excel forbids: '{name}'"
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
