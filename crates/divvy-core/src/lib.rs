//! divvy-core
//!
//! The ledger engine: balance computation, settlement, and member/expense
//! services over divvy-domain snapshots. No CLI, no terminal I/O, no direct
//! storage interactions.

pub mod balance_service;
pub mod error;
pub mod expense_service;
pub mod identity;
pub mod member_service;
pub mod settlement_service;
pub mod storage;
pub mod summary_service;

pub use balance_service::*;
pub use error::CoreError;
pub use expense_service::*;
pub use identity::*;
pub use member_service::*;
pub use settlement_service::*;
pub use storage::{ledger_warnings, LedgerBackupInfo, LedgerStorage};
pub use summary_service::*;

#[cfg(test)]
mod tests;
