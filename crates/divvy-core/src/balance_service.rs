//! Pairwise and aggregate balance computation over a ledger snapshot.

use uuid::Uuid;

use divvy_domain::{Expense, Ledger, MinorUnits};

/// The viewer's position across every counterparty in one ledger.
///
/// Receivable and payable are clamped per counterparty before summing, so
/// being owed by one member never offsets a debt to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BalanceSheet {
    pub receivable: MinorUnits,
    pub payable: MinorUnits,
    pub net: MinorUnits,
}

/// A named balance row for one counterparty, positive when they owe the
/// viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterpartyBalance {
    pub member_id: Uuid,
    pub name: String,
    pub amount: MinorUnits,
}

/// Pure balance queries. Nothing here mutates the ledger, so concurrent
/// readers are always safe.
pub struct BalanceService;

impl BalanceService {
    /// What `member_id` owes for `expense`, independent of who paid.
    pub fn share_of(expense: &Expense, member_id: Uuid) -> MinorUnits {
        expense.share_of(member_id)
    }

    /// Signed balance between `viewer_id` and `other_id`.
    ///
    /// Positive means `other_id` owes the viewer. Contributions are never
    /// netted through a third party, and ids missing from the member roster
    /// contribute nothing.
    pub fn bilateral_balance(ledger: &Ledger, viewer_id: Uuid, other_id: Uuid) -> MinorUnits {
        if viewer_id == other_id
            || !ledger.has_member(viewer_id)
            || !ledger.has_member(other_id)
        {
            return 0;
        }
        let mut balance = 0;
        for expense in &ledger.expenses {
            if expense.payer_id == viewer_id
                && expense.participants.contains(&other_id)
                && !expense.is_settled_by(other_id)
            {
                balance += expense.share_of(other_id);
            } else if expense.payer_id == other_id
                && expense.participants.contains(&viewer_id)
                && !expense.is_settled_by(viewer_id)
            {
                balance -= expense.share_of(viewer_id);
            }
        }
        balance
    }

    /// Receivable/payable/net totals for the viewer across the whole roster.
    pub fn aggregate_balances(ledger: &Ledger, viewer_id: Uuid) -> BalanceSheet {
        let mut sheet = BalanceSheet::default();
        for member in &ledger.members {
            if member.id == viewer_id {
                continue;
            }
            let balance = Self::bilateral_balance(ledger, viewer_id, member.id);
            if balance > 0 {
                sheet.receivable += balance;
            } else {
                sheet.payable += -balance;
            }
        }
        sheet.net = sheet.receivable - sheet.payable;
        sheet
    }

    /// Non-zero balances per counterparty, largest receivable first.
    pub fn counterparty_balances(ledger: &Ledger, viewer_id: Uuid) -> Vec<CounterpartyBalance> {
        let mut rows: Vec<CounterpartyBalance> = ledger
            .members
            .iter()
            .filter(|m| m.id != viewer_id)
            .filter_map(|m| {
                let amount = Self::bilateral_balance(ledger, viewer_id, m.id);
                (amount != 0).then(|| CounterpartyBalance {
                    member_id: m.id,
                    name: m.display_name.clone(),
                    amount,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.amount.cmp(&a.amount));
        rows
    }
}
