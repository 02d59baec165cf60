use thiserror::Error;
use uuid::Uuid;

use divvy_domain::ValidationError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Ledger not found: {0}")]
    LedgerNotFound(String),
    #[error("Member not found: {0}")]
    MemberNotFound(String),
    #[error("Expense not found: {0}")]
    ExpenseNotFound(Uuid),
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Storage error: {0}")]
    Storage(String),
}
