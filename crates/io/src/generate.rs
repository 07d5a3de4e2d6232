//! Bytes in, bytes out: the whole reconciliation in one call.

use icprecon_recon::config::InputConfig;
use icprecon_recon::{InputSource, RawTable, ReconConfig, ReconError, ReconResult};

use crate::{reader, writer};

/// A generated reconciliation workbook and the result it was written from.
#[derive(Debug, Clone)]
pub struct Generated {
    pub bytes: Vec<u8>,
    pub result: ReconResult,
}

impl Generated {
    /// BLAKE3 hex digest of the workbook bytes.
    pub fn fingerprint(&self) -> String {
        blake3::hash(&self.bytes).to_hex().to_string()
    }
}

/// Read both workbooks, reconcile the partner's accounts, write the output workbook.
///
/// Any failure aborts the whole run; nothing partial is returned.
pub fn generate_reconciliation_file(
    trial_balance_bytes: &[u8],
    entries_bytes: &[u8],
    icp_code: &str,
    config: &ReconConfig,
) -> Result<Generated, ReconError> {
    config.validate()?;

    let tb = read_input(trial_balance_bytes, &config.trial_balance, InputSource::TrialBalance)?;
    let entries = read_input(entries_bytes, &config.entries, InputSource::Entries)?;

    let result = icprecon_recon::run(config, &tb, &entries, icp_code)?;
    let bytes = writer::write(&result, &config.output)?;

    log::info!(
        "{}: reconciliation workbook ready ({} rows, {} bytes, {} skipped input rows)",
        result.icp_code,
        result.rows.len(),
        bytes.len(),
        result.diagnostics().count()
    );

    Ok(Generated { bytes, result })
}

/// `generate_reconciliation_file` with the built-in column aliases and zero tolerance.
pub fn generate_reconciliation_file_default(
    trial_balance_bytes: &[u8],
    entries_bytes: &[u8],
    icp_code: &str,
) -> Result<Generated, ReconError> {
    generate_reconciliation_file(trial_balance_bytes, entries_bytes, icp_code, &ReconConfig::default())
}

fn read_input(bytes: &[u8], input: &InputConfig, source: InputSource) -> Result<RawTable, ReconError> {
    reader::read_sheet(bytes, input.sheet.as_deref(), source)
}
