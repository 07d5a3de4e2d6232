use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use crate::model::{AccountBalance, ReconStatus, ReconciliationRow};

/// Status for one account given which sides it appears on.
pub fn classify(
    trial_balance: Option<Decimal>,
    entries_total: Option<Decimal>,
    tolerance: Decimal,
) -> ReconStatus {
    match (trial_balance, entries_total) {
        (Some(tb), Some(total)) => {
            if (tb - total).abs() <= tolerance {
                ReconStatus::Matched
            } else {
                ReconStatus::Variance
            }
        }
        (None, _) => ReconStatus::MissingInTb,
        (Some(_), None) => ReconStatus::MissingInEntries,
    }
}

/// Pair trial balance accounts with entry totals.
///
/// One row per account id found on either side, ascending by account id.
/// A missing side counts as zero.
///
/// `balances` may hold an account more than once when it did not come from
/// [`normalize_trial_balance`](crate::normalize::normalize_trial_balance),
/// which merges repeats itself. Repeats are summed here too, so a caller
/// building balances by hand still gets one row per account.
pub fn build(
    balances: &[AccountBalance],
    entries_totals: &BTreeMap<String, Decimal>,
    tolerance: Decimal,
) -> Vec<ReconciliationRow> {
    let mut tb: BTreeMap<&str, (&str, Decimal)> = BTreeMap::new();
    for b in balances {
        let slot = tb
            .entry(b.account_id.as_str())
            .or_insert((b.account_name.as_str(), Decimal::ZERO));
        slot.1 += b.balance;
        if slot.0.is_empty() {
            slot.0 = b.account_name.as_str();
        }
    }

    let accounts: BTreeSet<&str> = tb
        .keys()
        .copied()
        .chain(entries_totals.keys().map(String::as_str))
        .collect();

    accounts
        .into_iter()
        .map(|account_id| {
            let tb_side = tb.get(account_id);
            let entries_side = entries_totals.get(account_id).copied();
            let status = classify(tb_side.map(|(_, amount)| *amount), entries_side, tolerance);

            let trial_balance_amount = tb_side.map(|(_, amount)| *amount).unwrap_or(Decimal::ZERO);
            let entries_total = entries_side.unwrap_or(Decimal::ZERO);

            ReconciliationRow {
                account_id: account_id.to_string(),
                account_name: tb_side.map(|(name, _)| name.to_string()).unwrap_or_default(),
                trial_balance_amount,
                entries_total,
                variance: trial_balance_amount - entries_total,
                status,
            }
        })
        .collect()
}
