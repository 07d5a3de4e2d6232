//! CLI Exit Code Registry
//!
//! Single source of truth for `icprecon` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | Variances found (only with `--fail-on-variance`)     |
//! | 2    | Usage error, unreadable input file, unwritable output |
//! | 60   | Input workbook cannot be parsed                      |
//! | 61   | Required column missing from an input                |
//! | 62   | ICP code matches no rows in either input             |
//! | 63   | Output workbook could not be written                 |
//! | 64   | Invalid configuration                                |

use icprecon_recon::ReconError;

/// Success - workbook generated (or config valid).
pub const EXIT_SUCCESS: u8 = 0;

/// Variances or missing accounts found and `--fail-on-variance` is set.
pub const EXIT_VARIANCE: u8 = 1;

/// Usage error - bad arguments, unreadable input, unwritable output path.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Reconciliation (60-69)
// =============================================================================

/// Input bytes are not a readable workbook, or the sheet has no header row.
pub const EXIT_MALFORMED_WORKBOOK: u8 = 60;

/// A required column is not present under any known alias.
pub const EXIT_MISSING_COLUMN: u8 = 61;

/// The ICP code matches no row in the trial balance or the entries.
pub const EXIT_NO_MATCHING_PARTNER: u8 = 62;

/// Serializing the output workbook failed.
pub const EXIT_WORKBOOK_WRITE: u8 = 63;

/// Config file or flag values rejected.
pub const EXIT_INVALID_CONFIG: u8 = 64;

/// Map a reconciliation error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::MalformedWorkbook { .. } => EXIT_MALFORMED_WORKBOOK,
        ReconError::MissingColumn { .. } => EXIT_MISSING_COLUMN,
        ReconError::NoMatchingPartner { .. } => EXIT_NO_MATCHING_PARTNER,
        ReconError::InvalidIcpCode => EXIT_USAGE,
        ReconError::WorkbookWrite(_) => EXIT_WORKBOOK_WRITE,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
    }
}
