use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::model::LedgerEntry;

/// Sum entry amounts per account.
///
/// Decimal addition is exact, so the totals don't depend on entry order.
pub fn aggregate(entries: &[LedgerEntry]) -> BTreeMap<String, Decimal> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();

    for entry in entries {
        *totals.entry(entry.account_id.clone()).or_insert(Decimal::ZERO) += entry.amount;
    }

    totals
}
