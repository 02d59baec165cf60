//! The ledger aggregate: members plus the expenses they share.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    expense::{Expense, SplitMode, ValidationError},
    member::Member,
};

const CURRENT_SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ledger {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            members: Vec::new(),
            expenses: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn add_member(&mut self, member: Member) -> Uuid {
        let id = member.id;
        self.members.push(member);
        self.touch();
        id
    }

    /// Adds a validated expense and returns its id.
    pub fn add_expense(&mut self, expense: Expense) -> Result<Uuid, ValidationError> {
        expense.validate()?;
        let id = expense.id;
        self.expenses.push(expense);
        self.touch();
        Ok(id)
    }

    pub fn member(&self, id: Uuid) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn member_by_name(&self, name: &str) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| m.display_name.eq_ignore_ascii_case(name))
    }

    pub fn has_member(&self, id: Uuid) -> bool {
        self.member(id).is_some()
    }

    pub fn expense(&self, id: Uuid) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    pub fn expense_mut(&mut self, id: Uuid) -> Option<&mut Expense> {
        self.expenses.iter_mut().find(|e| e.id == id)
    }

    /// Removes an expense; unknown ids are ignored.
    pub fn remove_expense(&mut self, id: Uuid) {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != id);
        if self.expenses.len() != before {
            self.touch();
        }
    }

    /// Removes a member and cascades through the expense list.
    ///
    /// Expenses the member paid become invalid and are pruned. Everywhere
    /// else the member is stripped from participants, settled sets, and
    /// exact share maps; an expense left without participants is pruned too.
    pub fn remove_member(&mut self, id: Uuid) {
        let before = self.members.len();
        self.members.retain(|m| m.id != id);
        if self.members.len() == before {
            return;
        }
        self.expenses.retain(|e| e.payer_id != id);
        for expense in &mut self.expenses {
            expense.participants.retain(|p| *p != id);
            expense.settled_by.remove(&id);
            if let SplitMode::Exact(shares) = &mut expense.split {
                shares.remove(&id);
            }
        }
        self.expenses.retain(|e| !e.participants.is_empty());
        self.touch();
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn expense_count(&self) -> usize {
        self.expenses.len()
    }
}
