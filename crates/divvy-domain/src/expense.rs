//! Expense records and the share arithmetic behind every balance.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{split_round_half_up, Displayable, Identifiable, MinorUnits};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// How an expense is divided among its participants.
///
/// `Exact` carries its share map so a mis-shaped expense cannot be
/// represented; the other modes derive shares from the participant list.
pub enum SplitMode {
    /// Every participant owes an equal share of the amount.
    Equal,
    /// Each listed member owes the mapped amount; the map must sum to the
    /// expense amount exactly.
    Exact(BTreeMap<Uuid, MinorUnits>),
    /// A direct loan or advance: everyone but the payer splits the full
    /// amount (normally a single counterparty).
    SingleParty,
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SplitMode::Equal => "Equal",
            SplitMode::Exact(_) => "Exact",
            SplitMode::SingleParty => "Loan",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Errors raised when an expense fails an invariant at construction or edit.
pub enum ValidationError {
    NonPositiveAmount(MinorUnits),
    NoParticipants,
    DuplicateParticipant(Uuid),
    ExactShareMismatch {
        expected: MinorUnits,
        actual: MinorUnits,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NonPositiveAmount(amount) => {
                write!(f, "expense amount must be positive, got {amount}")
            }
            ValidationError::NoParticipants => {
                f.write_str("expense must have at least one participant")
            }
            ValidationError::DuplicateParticipant(id) => {
                write!(f, "participant {id} listed more than once")
            }
            ValidationError::ExactShareMismatch { expected, actual } => {
                write!(
                    f,
                    "exact shares sum to {actual} but the expense amount is {expected}"
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Expense {
    pub id: Uuid,
    pub amount: MinorUnits,
    pub payer_id: Uuid,
    pub split: SplitMode,
    pub participants: Vec<Uuid>,
    #[serde(default)]
    pub settled_by: BTreeSet<Uuid>,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

impl Expense {
    /// Validates and builds a new expense. Rejected expenses never enter a
    /// ledger, so downstream balance code can assume the invariants hold.
    pub fn new(
        amount: MinorUnits,
        payer_id: Uuid,
        split: SplitMode,
        participants: Vec<Uuid>,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let expense = Self {
            id: Uuid::new_v4(),
            amount,
            payer_id,
            split,
            participants,
            settled_by: BTreeSet::new(),
            date,
            description: description.into(),
        };
        expense.validate()?;
        Ok(expense)
    }

    /// Re-checks construction invariants, used after edits.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.amount <= 0 {
            return Err(ValidationError::NonPositiveAmount(self.amount));
        }
        if self.participants.is_empty() {
            return Err(ValidationError::NoParticipants);
        }
        let mut seen = BTreeSet::new();
        for id in &self.participants {
            if !seen.insert(*id) {
                return Err(ValidationError::DuplicateParticipant(*id));
            }
        }
        if let SplitMode::Exact(shares) = &self.split {
            let total: MinorUnits = shares.values().sum();
            if total != self.amount {
                return Err(ValidationError::ExactShareMismatch {
                    expected: self.amount,
                    actual: total,
                });
            }
        }
        Ok(())
    }

    /// What `member_id` owes for this expense, independent of who paid.
    ///
    /// Zero eligible participants resolves to 0 rather than an arithmetic
    /// error; that state only arises after member pruning.
    pub fn share_of(&self, member_id: Uuid) -> MinorUnits {
        match &self.split {
            SplitMode::Exact(shares) => shares.get(&member_id).copied().unwrap_or(0),
            SplitMode::Equal => split_round_half_up(self.amount, self.participants.len() as i64),
            SplitMode::SingleParty => {
                // The payer never counts toward the divisor, even when the
                // caller erroneously listed them as a participant.
                let debtors = self
                    .participants
                    .iter()
                    .filter(|id| **id != self.payer_id)
                    .count();
                split_round_half_up(self.amount, debtors as i64)
            }
        }
    }

    pub fn involves(&self, member_id: Uuid) -> bool {
        self.payer_id == member_id || self.participants.contains(&member_id)
    }

    pub fn is_settled_by(&self, member_id: Uuid) -> bool {
        self.settled_by.contains(&member_id)
    }
}

impl Identifiable for Expense {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Expense {
    fn display_label(&self) -> String {
        format!("{} [{} {}]", self.description, self.split, self.amount)
    }
}
