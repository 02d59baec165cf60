//! Identity resolution at the collaborator boundary.
//!
//! Ledgers written before the viewer authenticated may carry a placeholder
//! id standing in for "the current user", and contacts added by hand get a
//! provisional id until the real person signs up. Both are normalized here,
//! before any balance query runs; the balance code itself never sees a
//! sentinel.

use uuid::Uuid;

use divvy_domain::{Ledger, SplitMode};

/// Placeholder id for "the current user" in unresolved ledgers.
pub const SELF_SENTINEL: Uuid = Uuid::nil();

/// Rewrites every occurrence of the self sentinel to the authenticated
/// viewer's member id.
pub fn normalize_ledger(ledger: &mut Ledger, viewer_id: Uuid) {
    reassign_member(ledger, SELF_SENTINEL, viewer_id);
}

/// Rewrites one member id to another across the whole ledger: the roster,
/// payer ids, participant lists, settled sets, and exact share maps.
///
/// When both ids already appear in the same expense the duplicates collapse;
/// colliding exact shares are summed so the split still covers the amount.
pub fn reassign_member(ledger: &mut Ledger, from: Uuid, to: Uuid) {
    if from == to {
        return;
    }
    let mut changed = false;

    if ledger.has_member(to) {
        // The real member already exists; drop the placeholder entry.
        let before = ledger.members.len();
        ledger.members.retain(|m| m.id != from);
        changed |= ledger.members.len() != before;
    } else {
        for member in &mut ledger.members {
            if member.id == from {
                changed = true;
                member.id = to;
            }
        }
    }

    for expense in &mut ledger.expenses {
        if expense.payer_id == from {
            expense.payer_id = to;
            changed = true;
        }
        if expense.participants.contains(&from) {
            changed = true;
            let mut rewritten = Vec::with_capacity(expense.participants.len());
            for id in expense.participants.drain(..) {
                let id = if id == from { to } else { id };
                if !rewritten.contains(&id) {
                    rewritten.push(id);
                }
            }
            expense.participants = rewritten;
        }
        if expense.settled_by.remove(&from) {
            expense.settled_by.insert(to);
            changed = true;
        }
        if let SplitMode::Exact(shares) = &mut expense.split {
            if let Some(share) = shares.remove(&from) {
                *shares.entry(to).or_insert(0) += share;
                changed = true;
            }
        }
    }

    if changed {
        ledger.touch();
    }
}
