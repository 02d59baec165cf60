//! CRUD orchestration for expenses.

use uuid::Uuid;

use divvy_domain::{Expense, Ledger};

use crate::CoreError;

pub struct ExpenseService;

impl ExpenseService {
    /// Validates and appends an expense to the ledger.
    pub fn add(ledger: &mut Ledger, expense: Expense) -> Result<Uuid, CoreError> {
        Ok(ledger.add_expense(expense)?)
    }

    /// Replaces an existing expense in place, revalidating the new record.
    ///
    /// Settlements already confirmed survive the edit as long as the member
    /// is still a participant.
    pub fn update(ledger: &mut Ledger, mut updated: Expense) -> Result<(), CoreError> {
        updated.validate()?;
        let Some(existing) = ledger.expense_mut(updated.id) else {
            return Err(CoreError::ExpenseNotFound(updated.id));
        };
        for member_id in &existing.settled_by {
            if updated.participants.contains(member_id) {
                updated.settled_by.insert(*member_id);
            }
        }
        *existing = updated;
        ledger.touch();
        Ok(())
    }

    pub fn remove(ledger: &mut Ledger, expense_id: Uuid) -> Result<(), CoreError> {
        if ledger.expense(expense_id).is_none() {
            return Err(CoreError::ExpenseNotFound(expense_id));
        }
        ledger.remove_expense(expense_id);
        Ok(())
    }
}
