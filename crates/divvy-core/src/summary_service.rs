//! Cross-ledger rollups for the viewer's home screen.

use std::collections::BTreeMap;

use uuid::Uuid;

use divvy_domain::{Expense, Ledger, MinorUnits};

use crate::balance_service::{BalanceService, BalanceSheet, CounterpartyBalance};

/// Counterparty balances merged across every ledger the viewer belongs to,
/// plus the overall totals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlobalSummary {
    pub totals: BalanceSheet,
    pub counterparties: Vec<CounterpartyBalance>,
}

pub struct SummaryService;

impl SummaryService {
    /// Merges per-ledger balances by member id, then clamps per
    /// counterparty. A friend who owes the viewer in one ledger and is owed
    /// in another nets out before entering the totals.
    pub fn global_balances(ledgers: &[Ledger], viewer_id: Uuid) -> GlobalSummary {
        let mut merged: BTreeMap<Uuid, (String, MinorUnits)> = BTreeMap::new();
        for ledger in ledgers {
            for row in BalanceService::counterparty_balances(ledger, viewer_id) {
                let entry = merged.entry(row.member_id).or_insert((row.name, 0));
                entry.1 += row.amount;
            }
        }

        let mut summary = GlobalSummary::default();
        for (member_id, (name, amount)) in merged {
            if amount == 0 {
                continue;
            }
            if amount > 0 {
                summary.totals.receivable += amount;
            } else {
                summary.totals.payable += -amount;
            }
            summary.counterparties.push(CounterpartyBalance {
                member_id,
                name,
                amount,
            });
        }
        summary.totals.net = summary.totals.receivable - summary.totals.payable;
        summary
            .counterparties
            .sort_by(|a, b| b.amount.cmp(&a.amount));
        summary
    }

    /// The viewer's expense history in one ledger, most recent first.
    pub fn related_expenses(ledger: &Ledger, viewer_id: Uuid) -> Vec<&Expense> {
        let mut related: Vec<&Expense> = ledger
            .expenses
            .iter()
            .filter(|e| e.involves(viewer_id))
            .collect();
        related.sort_by(|a, b| b.date.cmp(&a.date));
        related
    }
}
