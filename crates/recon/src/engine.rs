use crate::aggregate::aggregate;
use crate::build::build;
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::model::{RawTable, ReconResult};
use crate::normalize::{normalize_entries, normalize_icp, normalize_trial_balance};
use crate::summary::compute_summary;

/// Reconcile one partner's trial balance against its entries.
///
/// Takes already-read sheets. Fails when the ICP code is blank, when a
/// required column is missing, or when the code matches no row in either
/// input; bad individual rows are reported in the result instead.
pub fn run(
    config: &ReconConfig,
    trial_balance: &RawTable,
    entries: &RawTable,
    icp_code: &str,
) -> Result<ReconResult, ReconError> {
    config.validate()?;

    let icp = normalize_icp(icp_code);
    if icp.is_empty() {
        return Err(ReconError::InvalidIcpCode);
    }

    let tb = normalize_trial_balance(trial_balance, &icp, config)?;
    let en = normalize_entries(entries, &icp, config)?;

    if tb.partner_rows == 0 && en.partner_rows == 0 {
        log::warn!("ICP code {icp} matched no trial balance or entry rows");
        return Err(ReconError::NoMatchingPartner { icp_code: icp });
    }

    let totals = aggregate(&en.records);
    let rows = build(&tb.records, &totals, config.tolerance);
    let summary = compute_summary(&rows);

    log::info!(
        "{icp}: {} accounts, {} matched, {} variances, {} missing in TB, {} missing in entries",
        summary.accounts,
        summary.matched,
        summary.variances,
        summary.missing_in_tb,
        summary.missing_in_entries,
    );

    Ok(ReconResult {
        icp_code: icp,
        rows,
        summary,
        balances: tb.records,
        entries: en.records,
        trial_balance_diagnostics: tb.diagnostics,
        entries_diagnostics: en.diagnostics,
    })
}
