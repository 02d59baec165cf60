//! Settlement transitions: marking shares as repaid.

use uuid::Uuid;

use divvy_domain::Ledger;

/// What a settlement toggle actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// The member's share is now marked repaid.
    Settled,
    /// The member's share was already repaid and is now pending again.
    Unsettled,
    /// Stale expense id or a member outside the participant list; the
    /// ledger is unchanged.
    Skipped,
}

pub struct SettlementService;

impl SettlementService {
    /// Toggles `member_id` in the expense's settled set.
    ///
    /// Unknown expense ids and non-participants are tolerated silently so
    /// callers racing with deletions never fail here.
    pub fn settle(ledger: &mut Ledger, expense_id: Uuid, member_id: Uuid) -> SettleOutcome {
        let Some(expense) = ledger.expense_mut(expense_id) else {
            return SettleOutcome::Skipped;
        };
        if !expense.participants.contains(&member_id) {
            return SettleOutcome::Skipped;
        }
        let outcome = if expense.settled_by.remove(&member_id) {
            SettleOutcome::Unsettled
        } else {
            expense.settled_by.insert(member_id);
            SettleOutcome::Settled
        };
        ledger.touch();
        outcome
    }

    /// Settles every outstanding share `other_id` owes on expenses paid by
    /// `viewer_id`, returning how many shares were marked. Only debts owed
    /// *to* the viewer are touched; a repeat call is a no-op.
    pub fn settle_all(ledger: &mut Ledger, viewer_id: Uuid, other_id: Uuid) -> usize {
        let mut settled = 0;
        for expense in &mut ledger.expenses {
            if expense.payer_id == viewer_id
                && expense.participants.contains(&other_id)
                && expense.settled_by.insert(other_id)
            {
                settled += 1;
            }
        }
        if settled > 0 {
            ledger.touch();
        }
        settled
    }

    /// Field-level merge of settlement state from another snapshot of the
    /// same ledger: per expense, the union of both settled sets restricted
    /// to current participants. Two parties settling concurrently both keep
    /// their writes.
    pub fn merge_settlements(base: &mut Ledger, incoming: &Ledger) {
        let mut changed = false;
        for expense in &mut base.expenses {
            let Some(theirs) = incoming.expense(expense.id) else {
                continue;
            };
            for member_id in &theirs.settled_by {
                if expense.participants.contains(member_id)
                    && expense.settled_by.insert(*member_id)
                {
                    changed = true;
                }
            }
        }
        if changed {
            base.touch();
        }
    }
}
