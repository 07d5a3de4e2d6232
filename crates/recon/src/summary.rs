use rust_decimal::Decimal;

use crate::model::{ReconStatus, ReconSummary, ReconciliationRow};

/// Compute status counts and control totals from reconciliation rows.
pub fn compute_summary(rows: &[ReconciliationRow]) -> ReconSummary {
    let mut summary = ReconSummary {
        accounts: rows.len(),
        ..ReconSummary::default()
    };

    for r in rows {
        match r.status {
            ReconStatus::Matched => summary.matched += 1,
            ReconStatus::Variance => summary.variances += 1,
            ReconStatus::MissingInTb => summary.missing_in_tb += 1,
            ReconStatus::MissingInEntries => summary.missing_in_entries += 1,
        }
        summary.trial_balance_total += r.trial_balance_amount;
        summary.entries_total += r.entries_total;
    }

    summary.net_variance = summary.trial_balance_total - summary.entries_total;
    summary
}

impl ReconSummary {
    /// True when every account matched.
    pub fn is_clean(&self) -> bool {
        self.matched == self.accounts
    }

    /// Accounts that need attention.
    pub fn breaks(&self) -> usize {
        self.variances + self.missing_in_tb + self.missing_in_entries
    }

    pub fn has_net_variance(&self) -> bool {
        self.net_variance != Decimal::ZERO
    }
}
